//! Log file reading: complete-line extraction and offset tracking.

use std::io::Write;

use jarvys_interface::logs::read_new_lines;

#[tokio::test]
async fn reads_only_complete_lines_and_advances_the_offset() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "first\nsecond\npart").expect("write");

    let (lines, offset) = read_new_lines(file.path(), 0).await.expect("read");
    assert_eq!(lines, vec!["first", "second"]);
    assert_eq!(offset, "first\nsecond\n".len() as u64);

    // The partial line stays unread until its newline arrives.
    let (lines, same_offset) = read_new_lines(file.path(), offset).await.expect("read");
    assert!(lines.is_empty());
    assert_eq!(same_offset, offset);

    writeln!(file, "ial done").expect("write");
    let (lines, end) = read_new_lines(file.path(), offset).await.expect("read");
    assert_eq!(lines, vec!["partial done"]);
    assert_eq!(end, "first\nsecond\npartial done\n".len() as u64);
}

#[tokio::test]
async fn reading_from_an_offset_skips_earlier_lines() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "old").expect("write");
    let skip = "old\n".len() as u64;
    writeln!(file, "new").expect("write");

    let (lines, _) = read_new_lines(file.path(), skip).await.expect("read");
    assert_eq!(lines, vec!["new"]);
}
