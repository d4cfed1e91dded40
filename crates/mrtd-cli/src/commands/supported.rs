pub fn cmd_supported() -> bool {
    let supported = mrtd_card::is_supported();

    if supported {
        println!("Passport reading supported: contactless reader available");
    } else {
        println!("Passport reading not supported: no PC/SC reader found");
    }

    supported
}
