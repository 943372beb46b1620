//! Built-in demo dataset: companies, people, products and orders.
//!
//! People and products reference companies, orders reference products. At
//! full scale this is 11.25 million rows, so use the session scale factor for
//! local runs.

use crate::column::{Biased, Reference};
use crate::error::Result;
use crate::fake::{FakeKind, FakeValue};
use crate::session::{Session, TableHandle};
use crate::spec::TableSpec;

pub const COMPANIES: u64 = 50_000;
pub const PEOPLE: u64 = 200_000;
pub const PRODUCTS: u64 = 1_000_000;
pub const ORDERS: u64 = 10_000_000;

/// Handles of the demo tables, in output order
#[derive(Debug, Clone, Copy)]
pub struct DemoTables {
    pub companies: TableHandle,
    pub people: TableHandle,
    pub products: TableHandle,
    pub orders: TableHandle,
}

impl DemoTables {
    pub fn all(&self) -> [TableHandle; 4] {
        [self.companies, self.people, self.products, self.orders]
    }
}

fn fake(kind: FakeKind) -> FakeValue {
    FakeValue::new(kind)
}

/// Register the demo tables with `session`
pub fn register(session: &mut Session) -> Result<DemoTables> {
    let companies = session.add(
        TableSpec::builder("companies", COMPANIES)
            .column("Name", fake(FakeKind::CompanyName))
            .column("Mission", fake(FakeKind::CatchPhrase))
            .column("Address", fake(FakeKind::Address))
            .column("Image", fake(FakeKind::ImageUrl).with_category("business"))
            .column("URL", fake(FakeKind::Url))
            .column("ID", fake(FakeKind::AlphaId).with_prefix("cmp-"))
            .build()?,
    );

    let people = session.add(
        TableSpec::builder("people", PEOPLE)
            .column("Name", fake(FakeKind::Name))
            .column("Title", fake(FakeKind::JobTitle))
            // Everyone with the same title shares a handful of salaries
            .column(
                "Salary",
                Biased::new(fake(FakeKind::Salary)).keyed_by_column("Title"),
            )
            .column("Email", fake(FakeKind::Email))
            .column("Phone", fake(FakeKind::Phone))
            .column("Photo", fake(FakeKind::AvatarUrl))
            .column("CompanyID", Reference::new(companies, "ID"))
            .build()?,
    );

    let products = session.add(
        TableSpec::builder("products", PRODUCTS)
            .column("Name", fake(FakeKind::ProductName))
            .column("Material", fake(FakeKind::Material))
            .column("Category", fake(FakeKind::Department))
            .column("Image", fake(FakeKind::ImageUrl).with_category("technics"))
            .column(
                "Price",
                Biased::new(fake(FakeKind::Price)).keyed_by_column("Category"),
            )
            .column("ID", fake(FakeKind::AlphaId).with_prefix("prd-"))
            .column("CompanyID", Reference::new(companies, "ID"))
            .build()?,
    );

    let orders = session.add(
        TableSpec::builder("orders", ORDERS)
            .column("ID", fake(FakeKind::AlphaId).with_prefix("ord-"))
            .column("ProductID", Reference::new(products, "ID"))
            .column("Quantity", fake(FakeKind::Integer).with_range(1.0, 99.0)?)
            .column("Date", fake(FakeKind::PastDate).with_years(3)?)
            .build()?,
    );

    Ok(DemoTables {
        companies,
        people,
        products,
        orders,
    })
}
