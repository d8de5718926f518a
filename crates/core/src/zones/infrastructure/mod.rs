pub mod zone_file_loader;
