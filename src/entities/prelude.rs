pub use super::currencies::Entity as Currencies;
pub use super::price_samples::Entity as PriceSamples;
