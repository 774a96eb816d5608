use rand::{thread_rng, Rng};
use std::ops::RangeInclusive;

/// Inclusive range every issued code falls in.
pub const OTP_RANGE: RangeInclusive<i32> = 1000..=9999;

/// Source of one-time codes. Injected so tests can pin the value.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> i32 {
        thread_rng().gen_range(OTP_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_have_four_digits() {
        let generator = RandomCodeGenerator;
        for _ in 0..500 {
            let code = generator.generate();
            assert!(OTP_RANGE.contains(&code), "{} out of range", code);
        }
    }
}
