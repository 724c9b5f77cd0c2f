pub mod vendor_server;

use std::io::Write;

/// Bytes of a small but real zip archive, standing in for an APK.
pub fn package_bytes(marker: &str) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("AndroidManifest.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(marker.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf.into_inner()
}
