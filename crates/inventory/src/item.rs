use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockscan_core::{Barcode, DomainError, DomainResult, Entity};

/// Highest unit price accepted (one trillion).
///
/// Keeps `price * u32::MAX`, and the sum over any realistic inventory, inside
/// `Decimal`'s range.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// One inventory line.
///
/// Constructed through [`Item::new`] or [`ItemForm::validate`], both of which
/// reject empty names and negative prices. Quantities are unsigned, so the
/// non-negative invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    barcode: Barcode,
    name: String,
    category: String,
    quantity: u32,
    price: Decimal,
    #[serde(rename = "reorder")]
    reorder_threshold: u32,
}

impl Item {
    pub fn new(
        barcode: Barcode,
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        price: Decimal,
        reorder_threshold: u32,
    ) -> DomainResult<Self> {
        let item = Self {
            barcode,
            name: name.into().trim().to_string(),
            category: category.into().trim().to_string(),
            quantity,
            price,
            reorder_threshold,
        };
        item.validate()?;
        Ok(item)
    }

    /// Re-check invariants that deserialization cannot enforce.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_field("name", "cannot be empty"));
        }
        check_price(self.price)?;
        Ok(())
    }

    pub fn barcode(&self) -> &Barcode {
        &self.barcode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn reorder_threshold(&self) -> u32 {
        self.reorder_threshold
    }

    /// `quantity <= reorder_threshold`.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    /// price × quantity, saturating at `Decimal::MAX`.
    pub fn value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Fold an incoming record for the same barcode into this one.
    ///
    /// Quantity is summed; name, price and reorder threshold take the incoming
    /// values. Category is kept.
    pub(crate) fn absorb(&mut self, incoming: &Item) -> DomainResult<()> {
        if !self.same_identity(incoming) {
            return Err(DomainError::validation(format!(
                "cannot merge {} into {}",
                incoming.barcode, self.barcode
            )));
        }

        let quantity = self
            .quantity
            .checked_add(incoming.quantity)
            .ok_or_else(|| DomainError::invalid_field("quantity", "merged quantity overflows"))?;

        self.quantity = quantity;
        self.name = incoming.name.clone();
        self.price = incoming.price;
        self.reorder_threshold = incoming.reorder_threshold;
        Ok(())
    }
}

impl Entity for Item {
    type Id = Barcode;

    fn id(&self) -> &Self::Id {
        &self.barcode
    }
}

/// Raw, user-typed item fields.
///
/// This is the validation boundary: nothing reaches the store without passing
/// through [`ItemForm::validate`] (or the CSV line parser).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub price: String,
    pub reorder: String,
}

impl ItemForm {
    /// Pre-fill a form from an existing item (edit flow).
    pub fn from_item(item: &Item) -> Self {
        Self {
            barcode: item.barcode.to_string(),
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity.to_string(),
            price: item.price.to_string(),
            reorder: item.reorder_threshold.to_string(),
        }
    }

    /// Empty form with only the barcode filled in (scan flow).
    pub fn scanned(barcode: &Barcode) -> Self {
        Self {
            barcode: barcode.to_string(),
            ..Self::default()
        }
    }

    /// Parse and validate every field, reporting the first invalid one.
    pub fn validate(&self) -> DomainResult<Item> {
        let barcode = Barcode::parse(&self.barcode)?;
        let name = parse_name(&self.name)?;
        let quantity = parse_count("quantity", &self.quantity)?;
        let price = parse_price(&self.price)?;
        let reorder = parse_count("reorder", &self.reorder)?;

        Item::new(barcode, name, self.category.trim(), quantity, price, reorder)
    }
}

pub(crate) fn parse_name(raw: &str) -> DomainResult<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::invalid_field("name", "cannot be empty"));
    }
    Ok(name)
}

/// Non-negative whole number.
pub(crate) fn parse_count(field: &'static str, raw: &str) -> DomainResult<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().map_err(|_| {
        DomainError::invalid_field(field, format!("expected a whole number >= 0, got {raw:?}"))
    })
}

/// Non-negative decimal amount.
pub(crate) fn parse_price(raw: &str) -> DomainResult<Decimal> {
    let raw = raw.trim();
    let price = Decimal::from_str(raw)
        .map_err(|_| DomainError::invalid_field("price", format!("expected a number, got {raw:?}")))?;
    check_price(price)?;
    Ok(price)
}

fn check_price(price: Decimal) -> DomainResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::invalid_field("price", "cannot be negative"));
    }
    if price > MAX_PRICE {
        return Err(DomainError::invalid_field(
            "price",
            format!("cannot exceed {MAX_PRICE}"),
        ));
    }
    Ok(())
}
