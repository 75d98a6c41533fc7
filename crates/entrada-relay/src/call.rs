//! The enumerated call set and its wire codec.
//!
//! Only the calls listed here can be relayed; the set is closed. The wire
//! form is a one-byte selector tag followed by fixed-width big-endian
//! fields at the natural width of each identifier (event ids 4 bytes,
//! section/seat ids 2 bytes, amounts and dates 8 bytes, addresses 32
//! bytes). Variable-length fields carry a 2-byte count. Decoding rejects
//! unknown tags, truncated payloads and trailing bytes.

use entrada_types::{Address, EventId, PlatformId, SeatId, SectionId, TicketId};
use serde::{Deserialize, Serialize};

use crate::{RelayError, Result};

const TAG_CREATE_EVENT: u8 = 1;
const TAG_ADD_SECTION: u8 = 2;
const TAG_BUY_TICKET: u8 = 3;
const TAG_BUY_TICKETS_BATCH: u8 = 4;
const TAG_WITHDRAW_FUNDS: u8 = 5;
const TAG_SET_APPROVAL_FOR_ALL: u8 = 6;
const TAG_SAFE_TRANSFER_FROM: u8 = 7;

/// A ledger operation that can be relayed on a signer's behalf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayCall {
    /// Create an event under a platform.
    CreateEvent {
        platform: PlatformId,
        start_sell_date: u64,
        start_withdrawal_date: u64,
    },
    /// Add a section to an owned event.
    AddSection {
        event: EventId,
        quantity: u16,
        price: u64,
    },
    /// Buy a single seat.
    BuyTicket {
        event: EventId,
        section: SectionId,
        seat: SeatId,
    },
    /// Buy several seats of one event atomically. The arrays are
    /// parallel and share one count on the wire.
    BuyTicketsBatch {
        event: EventId,
        sections: Vec<SectionId>,
        seats: Vec<SeatId>,
    },
    /// Withdraw an owned event's proceeds.
    WithdrawFunds { event: EventId },
    /// Grant or revoke an operator for all of the signer's tickets.
    SetApprovalForAll { operator: Address, approved: bool },
    /// Move ticket units between accounts.
    SafeTransferFrom {
        from: Address,
        to: Address,
        ticket: TicketId,
        amount: u64,
        data: Vec<u8>,
    },
}

impl RelayCall {
    /// Encode to the wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            RelayCall::CreateEvent {
                platform,
                start_sell_date,
                start_withdrawal_date,
            } => {
                out.push(TAG_CREATE_EVENT);
                out.extend_from_slice(&platform.0.to_be_bytes());
                out.extend_from_slice(&start_sell_date.to_be_bytes());
                out.extend_from_slice(&start_withdrawal_date.to_be_bytes());
            }
            RelayCall::AddSection {
                event,
                quantity,
                price,
            } => {
                out.push(TAG_ADD_SECTION);
                out.extend_from_slice(&event.0.to_be_bytes());
                out.extend_from_slice(&quantity.to_be_bytes());
                out.extend_from_slice(&price.to_be_bytes());
            }
            RelayCall::BuyTicket {
                event,
                section,
                seat,
            } => {
                out.push(TAG_BUY_TICKET);
                out.extend_from_slice(&event.0.to_be_bytes());
                out.extend_from_slice(&section.0.to_be_bytes());
                out.extend_from_slice(&seat.0.to_be_bytes());
            }
            RelayCall::BuyTicketsBatch {
                event,
                sections,
                seats,
            } => {
                out.push(TAG_BUY_TICKETS_BATCH);
                out.extend_from_slice(&event.0.to_be_bytes());
                // Encoding enforces the parallel-array invariant; the
                // shorter length wins if a caller constructs a bad value.
                let count = sections.len().min(seats.len()).min(u16::MAX as usize);
                out.extend_from_slice(&(count as u16).to_be_bytes());
                for section in &sections[..count] {
                    out.extend_from_slice(&section.0.to_be_bytes());
                }
                for seat in &seats[..count] {
                    out.extend_from_slice(&seat.0.to_be_bytes());
                }
            }
            RelayCall::WithdrawFunds { event } => {
                out.push(TAG_WITHDRAW_FUNDS);
                out.extend_from_slice(&event.0.to_be_bytes());
            }
            RelayCall::SetApprovalForAll { operator, approved } => {
                out.push(TAG_SET_APPROVAL_FOR_ALL);
                out.extend_from_slice(operator.as_bytes());
                out.push(u8::from(*approved));
            }
            RelayCall::SafeTransferFrom {
                from,
                to,
                ticket,
                amount,
                data,
            } => {
                out.push(TAG_SAFE_TRANSFER_FROM);
                out.extend_from_slice(from.as_bytes());
                out.extend_from_slice(to.as_bytes());
                out.extend_from_slice(&ticket.0.to_be_bytes());
                out.extend_from_slice(&amount.to_be_bytes());
                let len = data.len().min(u16::MAX as usize);
                out.extend_from_slice(&(len as u16).to_be_bytes());
                out.extend_from_slice(&data[..len]);
            }
        }
        out
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// [`RelayError::MalformedCall`] for an unknown tag, a truncated
    /// payload or trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<RelayCall> {
        let mut reader = Reader::new(bytes);
        let call = match reader.u8()? {
            TAG_CREATE_EVENT => RelayCall::CreateEvent {
                platform: PlatformId(reader.u64()?),
                start_sell_date: reader.u64()?,
                start_withdrawal_date: reader.u64()?,
            },
            TAG_ADD_SECTION => RelayCall::AddSection {
                event: EventId(reader.u32()?),
                quantity: reader.u16()?,
                price: reader.u64()?,
            },
            TAG_BUY_TICKET => RelayCall::BuyTicket {
                event: EventId(reader.u32()?),
                section: SectionId(reader.u16()?),
                seat: SeatId(reader.u16()?),
            },
            TAG_BUY_TICKETS_BATCH => {
                let event = EventId(reader.u32()?);
                let count = reader.u16()? as usize;
                let mut sections = Vec::with_capacity(count);
                for _ in 0..count {
                    sections.push(SectionId(reader.u16()?));
                }
                let mut seats = Vec::with_capacity(count);
                for _ in 0..count {
                    seats.push(SeatId(reader.u16()?));
                }
                RelayCall::BuyTicketsBatch {
                    event,
                    sections,
                    seats,
                }
            }
            TAG_WITHDRAW_FUNDS => RelayCall::WithdrawFunds {
                event: EventId(reader.u32()?),
            },
            TAG_SET_APPROVAL_FOR_ALL => RelayCall::SetApprovalForAll {
                operator: reader.address()?,
                approved: match reader.u8()? {
                    0 => false,
                    1 => true,
                    _ => return Err(RelayError::MalformedCall),
                },
            },
            TAG_SAFE_TRANSFER_FROM => {
                let from = reader.address()?;
                let to = reader.address()?;
                let ticket = TicketId(reader.u64()?);
                let amount = reader.u64()?;
                let len = reader.u16()? as usize;
                let data = reader.bytes(len)?.to_vec();
                RelayCall::SafeTransferFrom {
                    from,
                    to,
                    ticket,
                    amount,
                    data,
                }
            }
            _ => return Err(RelayError::MalformedCall),
        };
        reader.finish()?;
        Ok(call)
    }
}

/// A bounds-checked big-endian reader over a call payload.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Reader<'a> {
        Reader { buf, pos: 0 }
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(RelayError::MalformedCall)?;
        if end > self.buf.len() {
            return Err(RelayError::MalformedCall);
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        b.copy_from_slice(self.bytes(2)?);
        Ok(u16::from_be_bytes(b))
    }

    fn u32(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.bytes(4)?);
        Ok(u32::from_be_bytes(b))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.bytes(8)?);
        Ok(u64::from_be_bytes(b))
    }

    fn address(&mut self) -> Result<Address> {
        let mut b = [0u8; 32];
        b.copy_from_slice(self.bytes(32)?);
        Ok(Address(b))
    }

    fn finish(self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(RelayError::MalformedCall);
        }
        Ok(())
    }
}
