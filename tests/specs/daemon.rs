mod idempotent_result;
