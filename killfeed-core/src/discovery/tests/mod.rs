mod walk_tests;
