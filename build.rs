fn main() {
    // ESP-IDF build environment only applies to the device target; host
    // builds (tests, fuzzing) skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
