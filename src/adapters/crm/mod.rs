pub mod lead_connector;
