use std::collections::HashMap;

use env_logger::Env;

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}

#[allow(dead_code)]
pub fn odd_or_none(x: i32) -> Option<i32> {
    (x % 2 == 1).then_some(x)
}

/// A book keyed by isbn, each isbn pointing at its author
#[allow(dead_code)]
pub struct Book {
    pub attributes: HashMap<String, String>,
}

#[allow(dead_code)]
pub fn book(attributes: &[(&str, &str)]) -> Book {
    Book {
        attributes: attributes
            .iter()
            .map(|(isbn, author)| (isbn.to_string(), author.to_string()))
            .collect(),
    }
}
