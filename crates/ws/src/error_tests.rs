// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn global_quota_exceeded_is_a_quota_kind() {
    assert_eq!(HubError::GlobalQuotaExceeded.kind(), Kind::QuotaExceeded);
}
