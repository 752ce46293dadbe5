mod actions_tests;
mod cose_tests;
mod crypto_tests;
mod guard_tests;
mod transaction_tests;
