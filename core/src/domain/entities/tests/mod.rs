mod token_tests;
mod verification_code_tests;
