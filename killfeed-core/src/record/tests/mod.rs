mod batch_tests;
