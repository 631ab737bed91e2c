//! Order value resolution
//!
//! Pure functions that decide an order's effective unit price and quantity
//! from the request payload, the referenced material/vehicle and (on update)
//! the stored order. The precedence is fixed:
//!
//! - unit price: explicit value > material reference price > stored value
//! - quantity:   explicit value > vehicle default load > stored value
//!
//! Anything still missing after the fallback chain resolves to 0, and
//! non-finite inputs are treated as missing. A zero-valued order is legal.

/// Pick the effective unit price for an order write.
pub fn resolve_unit_price(
    explicit: Option<f64>,
    material_price: Option<f64>,
    existing: Option<f64>,
) -> f64 {
    coerce(explicit)
        .or(coerce(material_price))
        .or(coerce(existing))
        .unwrap_or(0.0)
}

/// Pick the effective quantity (m³) for an order write.
pub fn resolve_quantity(
    explicit: Option<f64>,
    vehicle_quantity: Option<f64>,
    existing: Option<f64>,
) -> f64 {
    coerce(explicit)
        .or(coerce(vehicle_quantity))
        .or(coerce(existing))
        .unwrap_or(0.0)
}

/// Derived order total, always recomputed on write.
pub fn total_value(quantity: f64, unit_price: f64) -> f64 {
    quantity * unit_price
}

fn coerce(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
