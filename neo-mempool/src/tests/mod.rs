mod memory_pool_tests;
