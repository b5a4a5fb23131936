fn main() -> Result<(), Box<dyn std::error::Error>> {
    loanchat::cli::main()
}
