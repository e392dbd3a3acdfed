//! The `lingodrill grade` command.

use anyhow::Result;

use lingodrill_core::grade::{self, FeedbackTier};

pub fn execute(score: u32, total: u32) -> Result<()> {
    anyhow::ensure!(
        score <= total,
        "score {score} is larger than the total {total}"
    );

    let percentage = grade::percentage(score, total);
    println!("{score}/{total} correct: {percentage}%, grade {}", grade::grade(percentage));
    println!("{}", FeedbackTier::from_percentage(percentage).message());
    Ok(())
}
