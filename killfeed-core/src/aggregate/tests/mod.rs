mod fold_tests;
