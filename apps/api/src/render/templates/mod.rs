mod classic;
mod minimal;
mod prime_ats;
mod professional;

pub use classic::Classic;
pub use minimal::Minimal;
pub use prime_ats::PrimeAts;
pub use professional::Professional;
