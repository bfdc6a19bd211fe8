pub mod contact_parsing;
