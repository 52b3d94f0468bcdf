//! Raw HID character device transport: locating the node under sysfs,
//! exclusive open/close, fixed-size report reads and writes, and the
//! feature-report ioctls.

pub mod report;

use crate::error::{DriverError, ErrorKind, Result};
use parking_lot::Mutex;
use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

const REPORT_SIZE: usize = 64;

/// A single known device the daemon can drive, identified by its USB
/// vendor/product id and the HID interface number exposing the report set
/// this driver understands.
#[derive(Debug, Clone, Copy)]
pub struct KnownDevice {
    pub name: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_num: u16,
}

/// The device this driver targets: Valve's Steam Deck integrated controller.
pub const KNOWN_DEVICES: &[KnownDevice] = &[KnownDevice {
    name: "Valve Steam Deck Controller",
    vendor_id: 0x28de,
    product_id: 0x1205,
    interface_num: 2,
}];

fn hex4(v: u16) -> String {
    format!("{v:04X}")
}

/// Walks `/sys/devices` recursively looking for a path suffix of
/// `<vid>:<pid>.<iface+1>/hidraw`, then returns the `/dev/hidraw<N>` node
/// found inside the matching directory.
pub fn find_dev_node(vid: u16, pid: u16, iface_num: u16) -> Option<PathBuf> {
    let search_string = format!("{}:{}.{}/hidraw", hex4(vid), hex4(pid), hex4(iface_num + 1));
    tracing::trace!(%search_string, "searching for hidraw device");

    let sysfs = Path::new("/sys/devices");
    if !sysfs.exists() {
        return None;
    }

    let found = walk(sysfs, &search_string);
    match found {
        Some(dir) => {
            let mut device_sysfs_path = None;
            if let Ok(entries) = fs::read_dir(&dir) {
                for entry in entries.flatten() {
                    device_sysfs_path = Some(entry.path());
                }
            }
            let device_sysfs_path = device_sysfs_path?;
            let hidraw_node = Path::new("/dev").join(device_sysfs_path.file_name()?);
            match fs::metadata(&hidraw_node) {
                Ok(meta) if meta.file_type().is_char_device() => {
                    tracing::trace!(path = %hidraw_node.display(), "found matching hidraw device");
                    Some(hidraw_node)
                }
                _ => {
                    tracing::debug!(path = %hidraw_node.display(), "not a character device");
                    None
                }
            }
        }
        None => {
            tracing::debug!(%search_string, "failed to find any matching hidraw device");
            None
        }
    }
}

fn walk(dir: &Path, suffix: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        let path_str = path.as_os_str().as_bytes();
        if path_str.len() > suffix.len()
            && &path_str[path_str.len() - suffix.len()..] == suffix.as_bytes()
            && path.is_dir()
        {
            return Some(path);
        }
        if path.is_dir() {
            if let Some(found) = walk(&path, suffix) {
                return Some(found);
            }
        }
    }
    None
}

/// A serialized handle to a `/dev/hidraw*` character device.
pub struct Hidraw {
    fd: Mutex<i32>,
    path: Mutex<Option<PathBuf>>,
}

impl Hidraw {
    pub fn new() -> Self {
        Self {
            fd: Mutex::new(-1),
            path: Mutex::new(None),
        }
    }

    pub fn open(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(DriverError::new(
                ErrorKind::InvalidParameter,
                format!("{} does not exist", path.display()),
            ));
        }
        let meta = fs::metadata(path)?;
        if !meta.file_type().is_char_device() {
            return Err(DriverError::new(
                ErrorKind::InvalidParameter,
                format!("{} is not a character file", path.display()),
            ));
        }
        if self.is_open() {
            return Err(DriverError::new(ErrorKind::AlreadyOpen, "hidraw already open"));
        }

        let mut fd_guard = self.fd.lock();
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| DriverError::new(ErrorKind::InvalidParameter, "path contains NUL"))?;
        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDWR) };
        if fd < 0 {
            return Err(DriverError::new(
                ErrorKind::CannotOpen,
                format!("open({}) failed: {}", path.display(), std::io::Error::last_os_error()),
            ));
        }
        *fd_guard = fd;
        *self.path.lock() = Some(path.to_path_buf());
        tracing::trace!(path = %path.display(), "opened hidraw device");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        let fd = *self.fd.lock();
        fd > 0 && unsafe { libc::fcntl(fd, libc::F_GETFD) } >= 0
    }

    pub fn close(&self) {
        let mut fd_guard = self.fd.lock();
        if *fd_guard > 0 {
            unsafe { libc::close(*fd_guard) };
        }
        *fd_guard = -1;
        *self.path.lock() = None;
    }

    pub fn read(&self) -> Result<[u8; REPORT_SIZE]> {
        if !self.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "hidraw not open"));
        }
        let fd = *self.fd.lock();
        let mut buf = [0u8; REPORT_SIZE];
        let result = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, REPORT_SIZE) };
        if result < 0 {
            return Err(DriverError::new(
                ErrorKind::ReadFailed,
                std::io::Error::last_os_error().to_string(),
            ));
        }
        if result as usize != REPORT_SIZE {
            return Err(DriverError::new(
                ErrorKind::ReadFailed,
                format!("read {result} bytes, expected {REPORT_SIZE}"),
            ));
        }
        Ok(buf)
    }

    pub fn write(&self, data: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "hidraw not open"));
        }
        let fd = *self.fd.lock();
        let result = unsafe { libc::write(fd, data.as_ptr() as *const libc::c_void, data.len()) };
        if result < 0 {
            return Err(DriverError::new(
                ErrorKind::WriteFailed,
                std::io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }

    pub fn feature_get(&self, report_id: u8, len: usize) -> Result<Vec<u8>> {
        if !self.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "hidraw not open"));
        }
        let fd = *self.fd.lock();
        let mut buf = vec![0u8; len.max(1)];
        buf[0] = report_id;
        let result = unsafe { ioctl_hidiocgfeature(fd, &mut buf) };
        if result < 0 {
            return Err(DriverError::new(
                ErrorKind::ReadFailed,
                std::io::Error::last_os_error().to_string(),
            ));
        }
        buf.truncate(result as usize);
        Ok(buf)
    }

    pub fn feature_set(&self, data: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "hidraw not open"));
        }
        if data.is_empty() {
            return Err(DriverError::new(ErrorKind::InvalidParameter, "feature report is empty"));
        }
        let fd = *self.fd.lock();
        let result = unsafe { ioctl_hidiocsfeature(fd, data) };
        if result < 0 {
            return Err(DriverError::new(
                ErrorKind::WriteFailed,
                std::io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Hidraw {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Hidraw {
    fn drop(&mut self) {
        self.close();
    }
}

// HIDIOCGFEATURE/HIDIOCSFEATURE are variable-length ioctls (`_IOC` encodes
// the buffer size in the request itself), which `libc` doesn't expose as
// constants. Build the request number the same way <linux/hidraw.h> does.
const HID_IOC_MAGIC: u8 = b'H';
const HIDIOCGFEATURE_NR: u8 = 0x07;
const HIDIOCSFEATURE_NR: u8 = 0x06;

unsafe fn ioctl_hidiocgfeature(fd: i32, buf: &mut [u8]) -> i32 {
    let req = ioc_readwrite(HID_IOC_MAGIC, HIDIOCGFEATURE_NR, buf.len());
    unsafe { libc::ioctl(fd, req, buf.as_mut_ptr()) }
}

unsafe fn ioctl_hidiocsfeature(fd: i32, buf: &[u8]) -> i32 {
    let req = ioc_readwrite(HID_IOC_MAGIC, HIDIOCSFEATURE_NR, buf.len());
    unsafe { libc::ioctl(fd, req, buf.as_ptr()) }
}

fn ioc_readwrite(ty: u8, nr: u8, size: usize) -> libc::c_ulong {
    const IOC_WRITE: u32 = 1;
    const IOC_READ: u32 = 2;
    const IOC_NRSHIFT: u32 = 0;
    const IOC_TYPESHIFT: u32 = 8;
    const IOC_SIZESHIFT: u32 = 16;
    const IOC_DIRSHIFT: u32 = 30;

    let dir = IOC_WRITE | IOC_READ;
    (((dir << IOC_DIRSHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong)
}
