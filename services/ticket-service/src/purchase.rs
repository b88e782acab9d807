//! The ticket purchase form and its validation.
//!
//! [`PurchaseRequest`] is the raw JSON body. [`PurchaseRequest::validate`] runs
//! the field checks in order, stopping at the first failure, and produces a
//! [`ValidatedPurchase`] whose menu choices are typed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::payments::{NewOrder, TICKET_CURRENCY};
use crate::validation::{is_valid_email, UunValidator};

pub const MAX_SPECIAL_REQUESTS_LEN: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub token: String,
    pub full_name: String,
    pub uun: String,
    pub email: String,
    pub over18: bool,
    pub starter: String,
    pub main: String,
    pub dessert: String,
    pub special_reqs: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("Stripe token missing.")]
    MissingToken,
    #[error("You must be atleast 18 years of age to attend.")]
    Underage,
    #[error("Full name missing.")]
    MissingName,
    #[error("Invalid email format provided. Please email infball@comp-soc.com if this is a mistake.")]
    InvalidEmail,
    #[error("{0}")]
    InvalidUun(String),
    #[error("Invalid food selection.")]
    InvalidFood,
    #[error("Sorry, your request is limited to 500 characters. Please email infball@comp-soc.com for assistance.")]
    SpecialRequestsTooLong,
}

impl PurchaseError {
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseError::MissingToken => "missing_token",
            PurchaseError::Underage => "underage",
            PurchaseError::MissingName => "missing_name",
            PurchaseError::InvalidEmail => "invalid_email",
            PurchaseError::InvalidUun(_) => "invalid_uun",
            PurchaseError::InvalidFood => "invalid_food",
            PurchaseError::SpecialRequestsTooLong => "special_requests_too_long",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown menu item '{0}'")]
pub struct UnknownMenuItem(pub String);

macro_rules! menu_course {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownMenuItem;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownMenuItem(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

menu_course!(Starter {
    Soup => "soup",
    Salmon => "salmon",
    Pork => "pork",
});

menu_course!(Main {
    Beef => "beef",
    Salmon => "salmon",
    Chicken => "chicken",
    Mushrooms => "mushrooms",
});

menu_course!(Dessert {
    Brownie => "brownie",
    Toffee => "toffee",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealChoice {
    pub starter: Starter,
    pub main: Main,
    pub dessert: Dessert,
}

impl MealChoice {
    pub fn parse(starter: &str, main: &str, dessert: &str) -> Result<Self, UnknownMenuItem> {
        Ok(Self {
            starter: starter.parse()?,
            main: main.parse()?,
            dessert: dessert.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPurchase {
    pub token: String,
    pub full_name: String,
    pub uun: String,
    pub email: String,
    pub meal: MealChoice,
    pub special_requests: String,
}

impl PurchaseRequest {
    pub fn validate(
        self,
        uun_validator: &dyn UunValidator,
    ) -> Result<ValidatedPurchase, PurchaseError> {
        if self.token.is_empty() {
            return Err(PurchaseError::MissingToken);
        }
        if !self.over18 {
            return Err(PurchaseError::Underage);
        }
        if self.full_name.is_empty() {
            return Err(PurchaseError::MissingName);
        }
        if !is_valid_email(&self.email) {
            return Err(PurchaseError::InvalidEmail);
        }
        uun_validator
            .check(&self.uun)
            .map_err(|rejected| PurchaseError::InvalidUun(rejected.0))?;
        let meal = MealChoice::parse(&self.starter, &self.main, &self.dessert)
            .map_err(|_| PurchaseError::InvalidFood)?;
        // Counted in bytes.
        if self.special_reqs.len() > MAX_SPECIAL_REQUESTS_LEN {
            return Err(PurchaseError::SpecialRequestsTooLong);
        }

        Ok(ValidatedPurchase {
            token: self.token,
            full_name: self.full_name,
            uun: self.uun.trim().to_string(),
            email: self.email,
            meal,
            special_requests: self.special_reqs,
        })
    }
}

impl ValidatedPurchase {
    /// Order metadata. Purchaser and owner are the same person at purchase time.
    pub fn order_metadata(&self, auth_token: &str) -> BTreeMap<String, String> {
        [
            ("uun", self.uun.as_str()),
            ("purchaser_email", self.email.as_str()),
            ("purchaser_name", self.full_name.as_str()),
            ("owner_email", self.email.as_str()),
            ("owner_name", self.full_name.as_str()),
            ("over18", "true"),
            ("meal_starter", self.meal.starter.as_str()),
            ("meal_main", self.meal.main.as_str()),
            ("meal_dessert", self.meal.dessert.as_str()),
            ("special_requests", self.special_requests.as_str()),
            ("auth_token", auth_token),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    pub fn ticket_order(&self, sku: &str, auth_token: &str) -> NewOrder {
        NewOrder {
            sku: sku.to_string(),
            quantity: 1,
            currency: TICKET_CURRENCY,
            email: self.email.clone(),
            metadata: self.order_metadata(auth_token),
        }
    }
}
