use crate::Result;
use crate::logging::*;
use anyhow::anyhow;
use std::time::Duration;

pub fn get(name: &str) -> Result<String> {
    std::env::var(name).map_err(|err| anyhow!("{}: {}", err, name))
}

pub fn get_or(name: &str, default: &str) -> String {
    get(name).unwrap_or_else(|_| default.to_string())
}

pub fn get_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let log = DEFAULT.new(o!("function" => "config::get_number", "name" => name.to_owned()));
    match get(name) {
        Ok(value) => match value.parse() {
            Ok(number) => number,
            Err(err) => {
                warn!(log, "unparsable number, using default"; "value" => value, "error" => %err);
                default
            }
        },
        Err(_) => default,
    }
}

pub fn get_duration(name: &str, default: Duration) -> Duration {
    let log = DEFAULT.new(o!("function" => "config::get_duration", "name" => name.to_owned()));
    match get(name) {
        Ok(value) => match humantime::parse_duration(&value) {
            Ok(duration) => duration,
            Err(err) => {
                warn!(log, "unparsable duration, using default"; "value" => value, "error" => %err);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_or_prefers_env() {
        unsafe { std::env::set_var("CONFIG_TEST_VALUE", "from env") };
        assert_eq!(get_or("CONFIG_TEST_VALUE", "fallback"), "from env");
        unsafe { std::env::remove_var("CONFIG_TEST_VALUE") };
        assert_eq!(get_or("CONFIG_TEST_VALUE", "fallback"), "fallback");
    }

    #[test]
    #[serial]
    fn test_get_number_parses_and_falls_back() {
        unsafe { std::env::set_var("CONFIG_TEST_NUMBER", "2") };
        assert_eq!(get_number::<usize>("CONFIG_TEST_NUMBER", 0), 2);

        unsafe { std::env::set_var("CONFIG_TEST_NUMBER", "not a number") };
        assert_eq!(get_number::<usize>("CONFIG_TEST_NUMBER", 0), 0);

        unsafe { std::env::remove_var("CONFIG_TEST_NUMBER") };
        assert_eq!(get_number::<usize>("CONFIG_TEST_NUMBER", 7), 7);
    }

    #[test]
    #[serial]
    fn test_get_duration_parses_humantime() {
        unsafe { std::env::set_var("CONFIG_TEST_INTERVAL", "250ms") };
        assert_eq!(
            get_duration("CONFIG_TEST_INTERVAL", Duration::from_secs(1)),
            Duration::from_millis(250)
        );
        unsafe { std::env::set_var("CONFIG_TEST_INTERVAL", "2s") };
        assert_eq!(
            get_duration("CONFIG_TEST_INTERVAL", Duration::from_secs(1)),
            Duration::from_secs(2)
        );
        unsafe { std::env::remove_var("CONFIG_TEST_INTERVAL") };
    }

    #[test]
    #[serial]
    fn test_get_duration_falls_back() {
        unsafe { std::env::remove_var("CONFIG_TEST_INTERVAL") };
        let default = Duration::from_secs(1);
        assert_eq!(get_duration("CONFIG_TEST_INTERVAL", default), default);

        unsafe { std::env::set_var("CONFIG_TEST_INTERVAL", "not a duration") };
        assert_eq!(get_duration("CONFIG_TEST_INTERVAL", default), default);
        unsafe { std::env::remove_var("CONFIG_TEST_INTERVAL") };
    }
}
