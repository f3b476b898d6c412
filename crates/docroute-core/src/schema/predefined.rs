//! Built-in collection types

use super::{FieldDef, PredefinedSchema};

pub const GROCERY_INVENTORY: &str = "GroceryInventory";
pub const EMPLOYEES: &str = "Employees";

/// Grocery inventory items
pub fn grocery_inventory() -> PredefinedSchema {
    PredefinedSchema::new(GROCERY_INVENTORY, "GroceryItem")
        .field(FieldDef::string("item").required_with("item name is required"))
        .field(
            FieldDef::number("price_in_usd")
                .required_with("Please enter a number for price_in_usd"),
        )
        .field(
            FieldDef::string("food_group")
                .required_with("food_group is required")
                .one_of(&["fruits", "dairy", "proteins", "grains", "vegetables", "nuts"]),
        )
        .field(FieldDef::string("test").required_with("The property test is required"))
}

/// Personnel records
pub fn employees() -> PredefinedSchema {
    PredefinedSchema::new(EMPLOYEES, "Employee")
        .field(FieldDef::string("name").required_with("employee name is required"))
        .field(FieldDef::string("position").required_with("position is required"))
        .field(
            FieldDef::string("department")
                .required_with("department is required")
                .one_of(&[
                    "engineering",
                    "sales",
                    "marketing",
                    "operations",
                    "finance",
                    "hr",
                ]),
        )
        .field(FieldDef::number("salary"))
}
