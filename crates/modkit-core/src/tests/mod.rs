pub mod dependency_tests;
