pub mod db;
pub mod gemini;
pub mod image_hosting;
