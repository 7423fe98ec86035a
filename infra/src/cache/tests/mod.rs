mod code_store_tests;
