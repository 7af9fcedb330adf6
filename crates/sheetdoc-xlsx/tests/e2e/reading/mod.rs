mod data_types;
mod styles;
mod workbook;
