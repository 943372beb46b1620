//! Realistic value generators for common column kinds.
//!
//! Names, companies, addresses and phone numbers come from the `fake` crate;
//! commerce values (materials, departments, prices) and identifiers are drawn
//! from small word lists and `rand`.

use crate::column::ColumnGenerator;
use crate::error::{GenError, Result};
use crate::row::RowBuilder;
use crate::session::Session;
use crate::value::Value;
use chrono::{Duration, Utc};
use fake::faker::address::en::{BuildingNumber, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::internet::en::{DomainSuffix, SafeEmail};
use fake::faker::job::en::Title;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Upper bound for `past_date` look-back
pub const MAX_YEARS: u32 = 10_000;

const MILLIS_PER_YEAR: i64 = 365 * 24 * 60 * 60 * 1000;

const PRODUCT_ADJECTIVES: &[&str] = &[
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome", "Generic", "Handcrafted", "Handmade", "Licensed", "Refined",
    "Unbranded", "Tasty", "Modern", "Elegant", "Luxurious",
];

const MATERIALS: &[&str] = &[
    "Steel", "Bronze", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal",
    "Soft", "Fresh", "Frozen", "Marble", "Silk", "Leather", "Glass",
];

const PRODUCTS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants", "Shirt",
    "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese", "Bacon",
    "Pizza", "Salad", "Sausages", "Chips",
];

const DEPARTMENTS: &[&str] = &[
    "Books",
    "Movies",
    "Music",
    "Games",
    "Electronics",
    "Computers",
    "Home",
    "Garden",
    "Tools",
    "Grocery",
    "Health",
    "Beauty",
    "Toys",
    "Kids",
    "Baby",
    "Clothing",
    "Shoes",
    "Jewelery",
    "Sports",
    "Outdoors",
    "Automotive",
    "Industrial",
];

/// Kinds of values the catalog can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeKind {
    Name,
    FirstName,
    LastName,
    JobTitle,
    Email,
    Phone,
    CompanyName,
    CatchPhrase,
    StreetAddress,
    Address,
    Url,
    ImageUrl,
    AvatarUrl,
    AlphaId,
    Uuid,
    ProductName,
    Material,
    Department,
    Price,
    Salary,
    Integer,
    PastDate,
    Word,
    Sentence,
}

impl FakeKind {
    pub const ALL: &'static [FakeKind] = &[
        FakeKind::Name,
        FakeKind::FirstName,
        FakeKind::LastName,
        FakeKind::JobTitle,
        FakeKind::Email,
        FakeKind::Phone,
        FakeKind::CompanyName,
        FakeKind::CatchPhrase,
        FakeKind::StreetAddress,
        FakeKind::Address,
        FakeKind::Url,
        FakeKind::ImageUrl,
        FakeKind::AvatarUrl,
        FakeKind::AlphaId,
        FakeKind::Uuid,
        FakeKind::ProductName,
        FakeKind::Material,
        FakeKind::Department,
        FakeKind::Price,
        FakeKind::Salary,
        FakeKind::Integer,
        FakeKind::PastDate,
        FakeKind::Word,
        FakeKind::Sentence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FakeKind::Name => "name",
            FakeKind::FirstName => "first_name",
            FakeKind::LastName => "last_name",
            FakeKind::JobTitle => "job_title",
            FakeKind::Email => "email",
            FakeKind::Phone => "phone",
            FakeKind::CompanyName => "company_name",
            FakeKind::CatchPhrase => "catch_phrase",
            FakeKind::StreetAddress => "street_address",
            FakeKind::Address => "address",
            FakeKind::Url => "url",
            FakeKind::ImageUrl => "image_url",
            FakeKind::AvatarUrl => "avatar_url",
            FakeKind::AlphaId => "alpha_id",
            FakeKind::Uuid => "uuid",
            FakeKind::ProductName => "product_name",
            FakeKind::Material => "material",
            FakeKind::Department => "department",
            FakeKind::Price => "price",
            FakeKind::Salary => "salary",
            FakeKind::Integer => "integer",
            FakeKind::PastDate => "past_date",
            FakeKind::Word => "word",
            FakeKind::Sentence => "sentence",
        }
    }

    /// One-line description, shown by `relgen generators`
    pub fn description(&self) -> &'static str {
        match self {
            FakeKind::Name => "Full person name",
            FakeKind::FirstName => "Given name",
            FakeKind::LastName => "Family name",
            FakeKind::JobTitle => "Job title, e.g. 'Senior Data Analyst'",
            FakeKind::Email => "Email address on a safe domain",
            FakeKind::Phone => "Phone number",
            FakeKind::CompanyName => "Company name",
            FakeKind::CatchPhrase => "Company mission statement",
            FakeKind::StreetAddress => "Building number and street",
            FakeKind::Address => "Street, state abbreviation and zip code",
            FakeKind::Url => "Website URL",
            FakeKind::ImageUrl => "Placeholder image URL (param: category)",
            FakeKind::AvatarUrl => "Placeholder avatar URL",
            FakeKind::AlphaId => "Random lowercase letters (params: prefix, length)",
            FakeKind::Uuid => "Random version 4 UUID",
            FakeKind::ProductName => "Adjective, material and product",
            FakeKind::Material => "Product material",
            FakeKind::Department => "Store department",
            FakeKind::Price => "Two-decimal price (params: min, max)",
            FakeKind::Salary => "Yearly salary rounded to 1000 (params: min, max)",
            FakeKind::Integer => "Uniform integer (params: min, max)",
            FakeKind::PastDate => "Timestamp in the past (param: years)",
            FakeKind::Word => "Single lorem word",
            FakeKind::Sentence => "Short lorem sentence",
        }
    }

    /// Default `(min, max)` for the numeric kinds
    fn default_range(&self) -> (f64, f64) {
        match self {
            FakeKind::Price => (1.0, 1000.0),
            FakeKind::Salary => (30_000.0, 250_000.0),
            _ => (0.0, 100.0),
        }
    }

    /// Comma-separated list of every kind name
    pub fn valid_names() -> String {
        FakeKind::ALL
            .iter()
            .map(FakeKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for FakeKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        FakeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| GenError::UnknownGenerator {
                name: s.to_string(),
                valid: FakeKind::valid_names(),
            })
    }
}

impl fmt::Display for FakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured value generator from the catalog.
///
/// Every call is an independent draw; the row context is ignored.
#[derive(Debug, Clone)]
pub struct FakeValue {
    kind: FakeKind,
    prefix: String,
    length: usize,
    min: f64,
    max: f64,
    years: u32,
    category: String,
}

impl FakeValue {
    pub fn new(kind: FakeKind) -> Self {
        let (min, max) = kind.default_range();
        Self {
            kind,
            prefix: String::new(),
            length: 10,
            min,
            max,
            years: 3,
            category: "business".to_string(),
        }
    }

    pub fn kind(&self) -> FakeKind {
        self.kind
    }

    /// Text placed before random identifiers
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_length(mut self, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(self.invalid("length must be greater than 0"));
        }
        self.length = length;
        Ok(self)
    }

    /// Inclusive `(min, max)` used by the numeric kinds
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Inclusive bounds for numeric kinds
    pub fn with_range(mut self, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(self.invalid(&format!("invalid range {min}..={max}")));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    /// How far back `past_date` may reach
    pub fn with_years(mut self, years: u32) -> Result<Self> {
        if years == 0 || years > MAX_YEARS {
            return Err(self.invalid(&format!("years must be between 1 and {MAX_YEARS}")));
        }
        self.years = years;
        Ok(self)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    fn invalid(&self, reason: &str) -> GenError {
        GenError::InvalidGenerator {
            name: self.kind.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Draw one value
    pub fn sample(&self) -> Result<Value> {
        let mut rng = rand::rng();

        let value = match self.kind {
            FakeKind::Name => Value::Str(Name().fake()),
            FakeKind::FirstName => Value::Str(FirstName().fake()),
            FakeKind::LastName => Value::Str(LastName().fake()),
            FakeKind::JobTitle => Value::Str(Title().fake()),
            FakeKind::Email => Value::Str(SafeEmail().fake()),
            FakeKind::Phone => Value::Str(PhoneNumber().fake()),
            FakeKind::CompanyName => Value::Str(CompanyName().fake()),
            FakeKind::CatchPhrase => Value::Str(CatchPhrase().fake()),
            FakeKind::StreetAddress => Value::Str(street_address()),
            FakeKind::Address => {
                let state: String = StateAbbr().fake();
                let zip: String = ZipCode().fake();
                Value::Str(format!("{}, {} {}", street_address(), state, zip))
            }
            FakeKind::Url => {
                let word: String = Word().fake();
                let suffix: String = DomainSuffix().fake();
                Value::Str(format!("https://{}.{}", word, suffix))
            }
            FakeKind::ImageUrl => Value::Str(format!(
                "https://loremflickr.com/640/480/{}?lock={}",
                self.category,
                rng.random_range(1..100_000)
            )),
            FakeKind::AvatarUrl => Value::Str(format!(
                "https://i.pravatar.cc/300?u={}",
                rng.random_range(1..1_000_000)
            )),
            FakeKind::AlphaId => {
                let mut id = String::with_capacity(self.prefix.len() + self.length);
                id.push_str(&self.prefix);
                for _ in 0..self.length {
                    id.push(char::from(b'a' + rng.random_range(0..26u8)));
                }
                Value::Str(id)
            }
            FakeKind::Uuid => Value::Str(format!(
                "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
                rng.random::<u32>(),
                rng.random::<u16>(),
                (rng.random::<u16>() & 0x0FFF) | 0x4000, // Version 4
                (rng.random::<u16>() & 0x3FFF) | 0x8000, // Variant
                rng.random::<u64>() & 0xFFFF_FFFF_FFFF_u64
            )),
            FakeKind::ProductName => Value::Str(format!(
                "{} {} {}",
                pick(&mut rng, PRODUCT_ADJECTIVES),
                pick(&mut rng, MATERIALS),
                pick(&mut rng, PRODUCTS)
            )),
            FakeKind::Material => Value::from(pick(&mut rng, MATERIALS)),
            FakeKind::Department => Value::from(pick(&mut rng, DEPARTMENTS)),
            FakeKind::Price => {
                let cents = rng.random_range(cents(self.min)..=cents(self.max));
                Value::Str(format!("{}.{:02}", cents / 100, cents % 100))
            }
            FakeKind::Salary => {
                let (lo, hi) = (self.min as i64 / 1000, self.max as i64 / 1000);
                Value::Int(rng.random_range(lo..=hi.max(lo)) * 1000)
            }
            FakeKind::Integer => Value::Int(rng.random_range(self.min as i64..=self.max as i64)),
            FakeKind::PastDate => {
                let span = i64::from(self.years)
                    .checked_mul(MILLIS_PER_YEAR)
                    .ok_or_else(|| self.invalid("years out of range"))?;
                let ago = Duration::milliseconds(rng.random_range(0..span));
                let date = Utc::now()
                    .checked_sub_signed(ago)
                    .ok_or_else(|| self.invalid("date out of range"))?;
                Value::Timestamp(date)
            }
            FakeKind::Word => Value::Str(Word().fake()),
            FakeKind::Sentence => Value::Str(Sentence(3..8).fake()),
        };
        Ok(value)
    }
}

impl ColumnGenerator for FakeValue {
    fn generate(&mut self, _row: &RowBuilder<'_>, _session: &mut Session) -> Result<Value> {
        self.sample()
    }
}

fn street_address() -> String {
    let number: String = BuildingNumber().fake();
    let street: String = StreetName().fake();
    format!("{} {}", number, street)
}

fn pick<R: Rng>(rng: &mut R, words: &'static [&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

fn cents(amount: f64) -> u64 {
    (amount.max(0.0) * 100.0).round() as u64
}
