//! Synthetic employee dataset used when no data file is given.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use uuid::Builder;

use crate::model::{Column, ColumnKind, Dataset, Row, Value};

pub const DEPARTMENTS: [&str; 5] = ["Engineering", "Sales", "Marketing", "HR", "Finance"];
pub const RECRUITMENT_STATUSES: [&str; 4] = ["Active", "Inactive", "Pending", "Completed"];

const FIRST_NAMES: [&str; 16] = [
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Edsger", "Frances", "Grace", "Hedy", "Ivan",
    "John", "Katherine", "Linus", "Margaret", "Niklaus", "Radia",
];
const LAST_NAMES: [&str; 16] = [
    "Allen", "Backus", "Cerf", "Dijkstra", "Engelbart", "Floyd", "Goldberg", "Hamilton", "Hopper",
    "Johnson", "Knuth", "Lamport", "Liskov", "Perlman", "Ritchie", "Wirth",
];
const MAIL_DOMAINS: [&str; 4] = ["example.com", "example.org", "mail.test", "corp.test"];

pub fn columns() -> Vec<Column> {
    let select = |options: &[&str]| ColumnKind::Select {
        options: options.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        Column::new("name", 1, "Name", ColumnKind::String).with_width(200),
        Column::new("age", 2, "Age", ColumnKind::Number).with_width(100),
        Column::new("email", 3, "Email", ColumnKind::String).with_width(250),
        Column::new("department", 4, "Department", select(&DEPARTMENTS)),
        Column::new("Manager", 5, "Manager", ColumnKind::Boolean),
        Column::new(
            "recruitmentStatus",
            6,
            "Recruitment Status",
            select(&RECRUITMENT_STATUSES),
        )
        .with_width(150),
    ]
}

/// Build `rows` random records. The same seed yields the same dataset.
pub fn generate(rows: usize, seed: Option<u64>) -> Dataset {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let data = (0..rows).map(|_| random_row(&mut rng)).collect();
    Dataset::new(columns(), data)
}

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_row<R: Rng>(rng: &mut R) -> Row {
    let id = Builder::from_random_bytes(rng.random()).into_uuid();
    let first = pick(rng, &FIRST_NAMES);
    let last = pick(rng, &LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.random_range(1..100),
        pick(rng, &MAIL_DOMAINS)
    );

    Row::new(id.to_string())
        .with("name", format!("{first} {last}"))
        .with("age", Value::Number(rng.random_range(18..=65) as f64))
        .with("email", email)
        .with("department", pick(rng, &DEPARTMENTS))
        .with("Manager", rng.random_bool(0.5))
        .with("recruitmentStatus", pick(rng, &RECRUITMENT_STATUSES))
}
