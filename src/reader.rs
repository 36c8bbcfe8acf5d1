use log::{debug, error, warn};

use crate::config::ReaderConfig;
use crate::frame::{self, FRAME_OVERHEAD, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN};
use crate::h10301::H10301;
use crate::transport::ReaderTransport;
use crate::types::{bytes_to_hex, FrameError, ReaderError, KEY_GROUP_A, KEY_GROUP_B, PASSWORD_LEN};

/// Session with a 7941W module over an exclusively owned transport
pub struct Reader7941w<T: ReaderTransport> {
    transport: T,
    config: ReaderConfig,
}

impl<T: ReaderTransport> Reader7941w<T> {
    // Command codes
    const READ_UID: u8 = 0x12; // the module answers UID reads on the sector opcode
    const WRITE_UID: u8 = 0x11;
    const READ_SECTOR: u8 = 0x12;
    const WRITE_SECTOR: u8 = 0x14; // 0x13 is documented but ignored by the module
    const CHANGE_PASSWORD: u8 = 0x14;
    const READ_ID: u8 = 0x15;
    const WRITE_CHIP_ID: u8 = 0x16;
    const READ_ALL: u8 = 0x17;
    const READ_CONTACTLESS_UID: u8 = 0x19;
    const WRITE_TAG_SECTOR: u8 = 0x21;

    // Expected payload sizes, used to size the receive buffer
    const UID_LEN: usize = 6;
    const SECTOR_LEN: usize = 6;
    const ID_MAX_LEN: usize = 32;
    const BULK_MAX_LEN: usize = 128;

    /// Create a new reader instance with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ReaderConfig::default())
    }

    pub fn with_config(transport: T, config: ReaderConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Release the transport without flushing
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Flush pending output and release the transport
    pub fn close(mut self) -> Result<T, ReaderError> {
        self.transport
            .flush()
            .map_err(|e| ReaderError::Transport(format!("{:?}", e)))?;
        Ok(self.transport)
    }

    /// Read the UID of the card in the field
    pub fn read_uid(&mut self) -> Result<Vec<u8>, ReaderError> {
        self.exec(Self::READ_UID, &[], Self::UID_LEN)
    }

    /// Write a new UID, authenticating with the factory default key
    pub fn write_uid(&mut self, uid: &[u8]) -> Result<(), ReaderError> {
        Self::check_payload_len("UID", uid.len())?;
        self.exec(Self::WRITE_UID, uid, 0).map(|_| ())
    }

    /// Read one block of a Mifare sector
    ///
    /// # Arguments
    /// * `sector` - Sector number
    /// * `block` - Block within the sector
    /// * `group` - Key group, [`KEY_GROUP_A`] or [`KEY_GROUP_B`]
    /// * `password` - 6-byte sector key
    pub fn read_sector(
        &mut self,
        sector: u8,
        block: u8,
        group: u8,
        password: &[u8],
    ) -> Result<Vec<u8>, ReaderError> {
        Self::check_password("password", password)?;

        let mut params = Vec::with_capacity(3 + PASSWORD_LEN);
        params.extend_from_slice(&[sector, block, group]);
        params.extend_from_slice(password);

        self.exec(Self::READ_SECTOR, &params, Self::SECTOR_LEN)
    }

    /// Write one block of a Mifare sector
    ///
    /// # Arguments
    /// * `sector` - Sector number
    /// * `block` - Block within the sector
    /// * `group` - Key group, [`KEY_GROUP_A`] or [`KEY_GROUP_B`]
    /// * `password` - 6-byte sector key
    /// * `data` - Block contents
    pub fn write_sector(
        &mut self,
        sector: u8,
        block: u8,
        group: u8,
        password: &[u8],
        data: &[u8],
    ) -> Result<(), ReaderError> {
        Self::check_password("password", password)?;
        let max_data_len = MAX_PAYLOAD_LEN - 3 - PASSWORD_LEN;
        if data.len() > max_data_len {
            return Err(ReaderError::InvalidArgument(format!(
                "Sector data too long: {} bytes (maximum: {} bytes)",
                data.len(),
                max_data_len
            )));
        }

        let mut params = Vec::with_capacity(3 + PASSWORD_LEN + data.len());
        params.extend_from_slice(&[sector, block, group]);
        params.extend_from_slice(password);
        params.extend_from_slice(data);

        self.exec(Self::WRITE_SECTOR, &params, 0).map(|_| ())
    }

    /// Change the group A or group B key of a sector
    pub fn change_password(
        &mut self,
        sector: u8,
        group: u8,
        old_password: &[u8],
        new_password: &[u8],
    ) -> Result<(), ReaderError> {
        Self::check_password("old password", old_password)?;
        Self::check_password("new password", new_password)?;

        let mut params = Vec::with_capacity(2 + 2 * PASSWORD_LEN);
        params.extend_from_slice(&[sector, group]);
        params.extend_from_slice(old_password);
        params.extend_from_slice(new_password);

        self.exec(Self::CHANGE_PASSWORD, &params, 0).map(|_| ())
    }

    /// Read the number of a 125kHz ID card
    pub fn read_id(&mut self) -> Result<Vec<u8>, ReaderError> {
        self.exec(Self::READ_ID, &[], Self::ID_MAX_LEN)
    }

    /// Write a card number to a T5577 chip
    pub fn write_chip_id(&mut self, id: &[u8]) -> Result<(), ReaderError> {
        // One byte of the payload is taken by the length prefix
        let id_len = u8::try_from(id.len())
            .ok()
            .filter(|&len| usize::from(len) < MAX_PAYLOAD_LEN)
            .ok_or_else(|| {
                ReaderError::InvalidArgument(format!(
                    "Chip ID too long: {} bytes (maximum: {} bytes)",
                    id.len(),
                    MAX_PAYLOAD_LEN - 1
                ))
            })?;

        let mut params = Vec::with_capacity(1 + id.len());
        params.push(id_len);
        params.extend_from_slice(id);

        self.exec(Self::WRITE_CHIP_ID, &params, 0).map(|_| ())
    }

    /// Encode an H10301 card number and write it to a T5577 chip
    pub fn write_card_number(&mut self, card: &H10301) -> Result<(), ReaderError> {
        debug!("Writing H10301 facility {} id {}: {}", card.facility, card.id, card);
        self.write_chip_id(&card.encode())
    }

    /// Read every block of every sector of an M1-1K card
    ///
    /// # Arguments
    /// * `group` - Key group, [`KEY_GROUP_A`] or [`KEY_GROUP_B`]
    /// * `password` - 6-byte key used for all sectors
    pub fn read_all(&mut self, group: u8, password: &[u8]) -> Result<Vec<u8>, ReaderError> {
        if group != KEY_GROUP_A && group != KEY_GROUP_B {
            return Err(ReaderError::InvalidArgument(format!(
                "Key group must be 0x{:02X} or 0x{:02X}, got 0x{:02X}",
                KEY_GROUP_A, KEY_GROUP_B, group
            )));
        }
        Self::check_password("password", password)?;

        let mut params = Vec::with_capacity(1 + PASSWORD_LEN);
        params.push(group);
        params.extend_from_slice(password);

        self.exec(Self::READ_ALL, &params, Self::BULK_MAX_LEN)
    }

    /// Read the UID of an Ultralight tag card
    pub fn read_contactless_uid(&mut self) -> Result<Vec<u8>, ReaderError> {
        self.exec(Self::READ_CONTACTLESS_UID, &[], Self::BULK_MAX_LEN)
    }

    /// Write a sector of a tag card.
    ///
    /// The payload layout for this command is unknown, so nothing is sent.
    pub fn write_tag_sector(&mut self, sector: u8, data: &[u8]) -> Result<(), ReaderError> {
        warn!(
            "Write tag sector (0x{:02X}) is not supported: sector {}, {} bytes",
            Self::WRITE_TAG_SECTOR,
            sector,
            data.len()
        );
        Err(ReaderError::NotImplemented("write tag sector"))
    }

    fn check_password(name: &str, password: &[u8]) -> Result<(), ReaderError> {
        if password.len() != PASSWORD_LEN {
            return Err(ReaderError::InvalidArgument(format!(
                "{} must be {} bytes, got {}",
                name,
                PASSWORD_LEN,
                password.len()
            )));
        }
        Ok(())
    }

    fn check_payload_len(name: &str, len: usize) -> Result<(), ReaderError> {
        if len > MAX_PAYLOAD_LEN {
            return Err(ReaderError::InvalidArgument(format!(
                "{} does not fit in one frame: {} bytes (maximum: {} bytes)",
                name, len, MAX_PAYLOAD_LEN
            )));
        }
        Ok(())
    }

    /// One request/response cycle: send the command, wait for the module,
    /// then read and validate its reply
    fn exec(&mut self, command: u8, params: &[u8], expected_len: usize) -> Result<Vec<u8>, ReaderError> {
        let cmd = frame::encode_command(self.config.address, command, params);

        self.transport
            .clear_input()
            .map_err(|e| ReaderError::Transport(format!("{:?}", e)))?;
        debug!("Sending command: {}", bytes_to_hex(&cmd));
        let written = self
            .transport
            .write(&cmd)
            .map_err(|e| ReaderError::Transport(format!("{:?}", e)))?;
        debug!("Wrote {} bytes", written);

        debug!("Waiting {:?} for the module", self.config.settle_delay);
        std::thread::sleep(self.config.settle_delay);

        let response = self.receive(expected_len)?;
        let payload = frame::decode_response(&response)?;
        debug!("Response payload: {} bytes", payload.len());
        Ok(payload.to_vec())
    }

    /// Read until the frame is complete according to its length byte
    fn receive(&mut self, expected_len: usize) -> Result<Vec<u8>, ReaderError> {
        let timeout_ms = self.config.read_timeout_ms();
        let mut response = Vec::with_capacity(FRAME_OVERHEAD + expected_len);
        let mut chunk = [0u8; MAX_FRAME_LEN];

        loop {
            let target = frame::response_len(&response).unwrap_or(HEADER_LEN);
            if response.len() >= target {
                break;
            }

            match self.transport.read(&mut chunk[..target - response.len()], timeout_ms) {
                Ok(0) => break,
                Ok(bytes_read) => {
                    response.extend_from_slice(&chunk[..bytes_read]);
                    debug!("Received {} bytes: {}", bytes_read, bytes_to_hex(&chunk[..bytes_read]));
                }
                Err(e) => {
                    error!("Read error: {:?}", e);
                    return Err(ReaderError::Transport(format!("{:?}", e)));
                }
            }
        }

        if response.is_empty() {
            return Err(ReaderError::NoResponse);
        }

        let complete = frame::response_len(&response).is_some_and(|len| response.len() >= len);
        if !complete {
            warn!("Incomplete response: {}", bytes_to_hex(&response));
            return Err(FrameError::MalformedFrame { raw: response }.into());
        }

        Ok(response)
    }
}
