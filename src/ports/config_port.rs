//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_float(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Non-negative integer keys (window sizes, row counts).
    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        let fallback = default as i64;
        let value = self.get_int(section, key, fallback);
        if value < 0 { default } else { value as usize }
    }
}
