//! Generated book data for seeding development databases.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::domain::entities::NewBook;

const TITLE_ADJECTIVES: &[&str] = &[
    "Silent", "Broken", "Hidden", "Last", "Burning", "Distant", "Hollow", "Crimson", "Forgotten",
    "Endless", "Quiet", "Northern",
];

const TITLE_NOUNS: &[&str] = &[
    "Empire", "River", "Garden", "Machine", "Harbor", "Orchard", "Archive", "Lantern", "Desert",
    "Kingdom", "Signal", "Winter",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Frank", "Ursula", "Isaac", "Octavia", "Arthur", "Mary", "Philip", "Ray", "Ann",
];

const LAST_NAMES: &[&str] = &[
    "Herbert", "Le Guin", "Asimov", "Butler", "Clarke", "Shelley", "Dick", "Bradbury", "Leckie",
];

const SENTENCES: &[&str] = &[
    "A story of loss and stubborn hope.",
    "Two strangers cross a continent to keep a promise.",
    "The city remembers what its people forgot.",
    "An engineer finds a message older than the stars.",
    "Nobody returns from the northern pass unchanged.",
    "A family secret surfaces during the long winter.",
];

/// Builds one book with a random title, author, blurb and publication date.
pub fn fake_book<R: Rng + ?Sized>(rng: &mut R) -> NewBook {
    let title = format!(
        "The {} {}",
        pick(rng, TITLE_ADJECTIVES),
        pick(rng, TITLE_NOUNS)
    );
    let author = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));

    let sentences = rng.random_range(1..=3);
    let description = (0..sentences)
        .map(|_| pick(rng, SENTENCES))
        .collect::<Vec<_>>()
        .join(" ");

    NewBook {
        title,
        author,
        description,
        published_date: fake_date(rng),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &'static [&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

/// `YYYY-MM-DD` between 1900-01-01 and 2024-12-31.
fn fake_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
    let span = (end - start).num_days();

    let date = start + chrono::Duration::days(rng.random_range(0..=span));
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_book_fields_are_populated() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let book = fake_book(&mut rng);
            assert!(book.title.starts_with("The "));
            assert!(book.author.contains(' '));
            assert!(!book.description.is_empty());
            assert!(NaiveDate::parse_from_str(&book.published_date, "%Y-%m-%d").is_ok());
        }
    }
}
