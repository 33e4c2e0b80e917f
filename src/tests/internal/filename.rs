use crate::filename::{derive_filename, FilenameError};

#[test]
fn takes_last_path_segment() {
    assert_eq!(
        derive_filename("https://example.com/pub/files/ubuntu.iso").unwrap(),
        "ubuntu.iso"
    );
    assert_eq!(
        derive_filename("https://example.com/a/b.zip?token=abc#frag").unwrap(),
        "b.zip"
    );
}

#[test]
fn percent_decodes_and_replaces_illegal_chars() {
    assert_eq!(
        derive_filename("https://example.com/report%202024.pdf").unwrap(),
        "report 2024.pdf"
    );
    assert_eq!(
        derive_filename("https://example.com/a%3Ab%3Fc%2Fd.txt").unwrap(),
        "a_b_c_d.txt"
    );
    assert_eq!(
        derive_filename("https://example.com/%E4%B8%8B%E8%BD%BD.bin").unwrap(),
        "下载.bin"
    );
}

#[test]
fn trailing_slash_uses_previous_segment() {
    assert_eq!(
        derive_filename("https://example.com/releases/v1/").unwrap(),
        "v1"
    );
}

#[test]
fn no_usable_name_is_an_error() {
    assert!(matches!(
        derive_filename("https://example.com/"),
        Err(FilenameError::NoFileName(_))
    ));
    assert!(matches!(
        derive_filename("https://example.com/.."),
        Err(FilenameError::NoFileName(_))
    ));
    assert!(matches!(
        derive_filename("https://example.com/%2E%2E"),
        Err(FilenameError::NoFileName(_))
    ));
    assert!(matches!(
        derive_filename("not a url"),
        Err(FilenameError::InvalidUrl(_))
    ));
}

#[test]
fn trailing_dots_and_spaces_are_trimmed() {
    assert_eq!(
        derive_filename("https://example.com/name.txt.%20.").unwrap(),
        "name.txt"
    );
}
