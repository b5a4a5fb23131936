//! Shared constants used across the application

/// Persona and task rules sent ahead of the first turn on every request.
pub const SYSTEM_DIRECTIVE: &str = "You are a helpful loan assistant. You help users calculate and understand loans. \
You can remember previous questions and context. If the user asks to calculate a loan, ask for the principal amount, \
interest rate (as a percentage), and loan term (in years) if not already provided. If the user provides these details, \
calculate the monthly payment using the formula: M = P [ i(1 + i)^n ] / [ (1 + i)^n – 1 ], where M is the monthly payment, \
P is the principal loan amount, i is the monthly interest rate (annual rate divided by 12 and then by 100), and n is the \
total number of payments (loan term in years multiplied by 12). Also, ask about potential loan fees like processing fees \
or prepayment penalties.\n\n";

/// Model-role notice appended to the history when a request fails.
pub const ERROR_NOTICE: &str = "Sorry, I encountered an error.";

/// Placeholder shown while a response is in flight.
pub const PENDING_PLACEHOLDER: &str = "Typing...";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_REVEAL_CHARS_PER_TICK: usize = 1;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 30;

/// Quick topics offered alongside free-text input.
pub const LOAN_TOPICS: &[&str] = &[
    "Home Loan",
    "Car Loan",
    "Personal Loan",
    "Education Loan",
    "Business Loan",
];

pub fn topic_prompt(topic: &str) -> String {
    format!("Tell me more about {}.", topic.trim())
}
