pub mod excel_write;
pub mod xml_read;
