use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

static PHONE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\-+\s()]+$").unwrap());

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(field_error("required", "Phone number is required"));
    }
    if !PHONE_CHARS.is_match(phone) {
        return Err(field_error("phone", "Please enter a valid phone number"));
    }
    Ok(())
}

/// A goods provider. Products reference it through `Product::supplier_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(input: SupplierInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            address: input.address,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field.
    pub fn apply_update(&mut self, input: SupplierInput) {
        self.name = input.name;
        self.address = input.address;
        self.phone = input.phone;
        self.updated_at = Utc::now();
    }
}

/// An inventory item owned by exactly one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            supplier_id: input.supplier_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, input: ProductInput) {
        self.name = input.name;
        self.price = input.price;
        self.quantity = input.quantity;
        self.supplier_id = input.supplier_id;
        self.updated_at = Utc::now();
    }
}

/// Supplier fields attached to a product on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl From<&Supplier> for SupplierSummary {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name.clone(),
            address: supplier.address.clone(),
            phone: supplier.phone.clone(),
        }
    }
}

/// A product joined with its supplier.
///
/// `supplier` is `None` when the reference dangles, which can happen if a
/// product is inserted while its supplier is being deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub supplier: Option<SupplierSummary>,
}

/// A supplier together with the products that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierDetails {
    pub supplier: Supplier,
    pub products: Vec<Product>,
}

/// Validated supplier fields, already trimmed.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SupplierInput {
    #[validate(
        custom(function = "validate_required", message = "Supplier name is required"),
        length(max = 100, message = "Supplier name cannot exceed 100 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "validate_required", message = "Supplier address is required"),
        length(max = 255, message = "Address cannot exceed 255 characters")
    )]
    pub address: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

impl SupplierInput {
    pub fn new(name: &str, address: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            phone: phone.trim().to_string(),
        }
    }
}

/// Validated product fields. `supplier_id` existence is checked on write.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductInput {
    #[validate(
        custom(function = "validate_required", message = "Product name is required"),
        length(max = 100, message = "Product name cannot exceed 100 characters")
    )]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price must be a positive number"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must be a positive number"))]
    pub quantity: i64,
    pub supplier_id: Uuid,
}

/// Raw supplier form submission, kept verbatim for re-rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierForm {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl SupplierForm {
    /// Trim and validate into a [`SupplierInput`].
    pub fn parse(&self) -> Result<SupplierInput, ValidationErrors> {
        let input = SupplierInput::new(&self.name, &self.address, &self.phone);
        input.validate()?;
        Ok(input)
    }
}

impl From<&Supplier> for SupplierForm {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            address: supplier.address.clone(),
            phone: supplier.phone.clone(),
        }
    }
}

/// Raw product form submission. Numbers stay as text until [`ProductForm::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
    #[serde(rename = "supplierId")]
    pub supplier_id: String,
}

impl ProductForm {
    /// Convert and validate into a [`ProductInput`].
    ///
    /// Conversion failures and rule violations are reported together, keyed
    /// by form field name (`name`, `price`, `quantity`, `supplierId`). An
    /// empty quantity defaults to 0.
    pub fn parse(&self) -> Result<ProductInput, ValidationErrors> {
        let price = parse_price(&self.price);
        let quantity = parse_quantity(&self.quantity);
        let supplier_id = parse_supplier_id(&self.supplier_id);

        let input = ProductInput {
            name: self.name.trim().to_string(),
            price: price.as_ref().copied().unwrap_or_default(),
            quantity: quantity.as_ref().copied().unwrap_or_default(),
            supplier_id: supplier_id.as_ref().copied().unwrap_or_else(|_| Uuid::nil()),
        };

        // Placeholders for unparsed fields always pass the rules, so nothing
        // is reported twice.
        let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);
        if let Err(e) = price {
            errors.add("price", e);
        }
        if let Err(e) = quantity {
            errors.add("quantity", e);
        }
        if let Err(e) = supplier_id {
            errors.add("supplierId", e);
        }

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(errors)
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
            supplier_id: product.supplier_id.to_string(),
        }
    }
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(field_error("required", "Product price is required"));
    }
    match raw.parse::<f64>() {
        // Normalize -0 to 0.
        Ok(price) if price.is_finite() => Ok(if price == 0.0 { 0.0 } else { price }),
        _ => Err(field_error("number", "Price must be a number")),
    }
}

fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map_err(|_| field_error("integer", "Quantity must be a whole number"))
}

fn parse_supplier_id(raw: &str) -> Result<Uuid, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(field_error("required", "Supplier is required"));
    }
    Uuid::parse_str(raw).map_err(|_| supplier_missing())
}

/// Error reported on `supplierId` when the reference does not resolve.
pub fn supplier_missing() -> ValidationError {
    field_error("supplier_missing", "Supplier does not exist")
}

/// Parse a path identifier. Malformed ids are indistinguishable from unknown ones.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
