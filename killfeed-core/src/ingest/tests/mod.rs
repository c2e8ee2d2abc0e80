mod controller_tests;
