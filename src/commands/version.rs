pub fn run() {
    println!(
        "unnest {} (built {})",
        env!("BUILD_VERSION"),
        env!("BUILD_DATE")
    );
}
