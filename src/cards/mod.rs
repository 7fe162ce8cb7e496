pub mod card_record;
pub mod cardnumber;
pub mod rarity;
