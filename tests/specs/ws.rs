mod fanout;
