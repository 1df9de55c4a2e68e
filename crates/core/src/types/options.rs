//! Cart option selectors.
//!
//! A cart line is one product plus a combination of up to five selected
//! options. Each option is stored in its own nullable cart column and is
//! sourced from a product attribute with a fixed display name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the selectable option columns on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Color,
    Size,
    Capacity,
    UsbPort,
    TouchId,
}

impl OptionKind {
    /// All option kinds, in cart column order.
    pub const ALL: [Self; 5] = [
        Self::Color,
        Self::Size,
        Self::Capacity,
        Self::UsbPort,
        Self::TouchId,
    ];

    /// Product attribute name the option is selected from.
    #[must_use]
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Size => "Size",
            Self::Capacity => "Capacity",
            Self::UsbPort => "With USB 3 ports",
            Self::TouchId => "Touch ID in keyboard",
        }
    }

    /// Look up the option fed by an attribute name.
    #[must_use]
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.attribute_name().eq_ignore_ascii_case(name))
    }

    /// Whether quick-add picks the first listed value instead of the
    /// lexicographically smallest one.
    #[must_use]
    pub const fn quick_add_takes_first(self) -> bool {
        matches!(self, Self::Size | Self::Capacity)
    }
}

/// Selected options of a cart line. `None` means "not selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartOptions {
    pub color: Option<String>,
    pub size: Option<String>,
    pub capacity: Option<String>,
    pub usb_port: Option<String>,
    pub touch_id: Option<String>,
}

impl CartOptions {
    /// Get the value selected for an option.
    #[must_use]
    pub fn get(&self, kind: OptionKind) -> Option<&str> {
        match kind {
            OptionKind::Color => self.color.as_deref(),
            OptionKind::Size => self.size.as_deref(),
            OptionKind::Capacity => self.capacity.as_deref(),
            OptionKind::UsbPort => self.usb_port.as_deref(),
            OptionKind::TouchId => self.touch_id.as_deref(),
        }
    }

    /// Set the value selected for an option.
    pub fn set(&mut self, kind: OptionKind, value: Option<String>) {
        let slot = match kind {
            OptionKind::Color => &mut self.color,
            OptionKind::Size => &mut self.size,
            OptionKind::Capacity => &mut self.capacity,
            OptionKind::UsbPort => &mut self.usb_port,
            OptionKind::TouchId => &mut self.touch_id,
        };
        *slot = value;
    }

    /// Default options for a quick add.
    ///
    /// `attributes` yields `(name, value)` pairs in storage order (lowest
    /// attribute row id first). Size and Capacity take the first value seen;
    /// every other option takes the lexicographically smallest value.
    /// Attributes that do not feed an option are ignored.
    pub fn quick_add_defaults<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (name, value) in attributes {
            let Some(kind) = OptionKind::from_attribute_name(name) else {
                continue;
            };
            let replace = match options.get(kind) {
                None => true,
                Some(current) => !kind.quick_add_takes_first() && value < current,
            };
            if replace {
                options.set(kind, Some(value.to_owned()));
            }
        }
        options
    }
}

/// Invalid cart quantity.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("quantity must be at least 1 (got {0})")]
pub struct QuantityError(pub i32);

/// Validate a requested line quantity.
///
/// # Errors
///
/// Returns `QuantityError` if `quantity` is below 1.
pub const fn validate_quantity(quantity: i32) -> Result<i32, QuantityError> {
    if quantity < 1 {
        return Err(QuantityError(quantity));
    }
    Ok(quantity)
}
