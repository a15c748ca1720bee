fn main() {
    // Propagate ESP-IDF link arguments and cfgs from esp-idf-sys
    embuild::espidf::sysenv::output();
}
