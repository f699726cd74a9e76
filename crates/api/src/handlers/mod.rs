pub mod accounts;
pub mod merchants;
pub mod onboarding;
pub mod transactions;
