//! IP prefix arithmetic, following Terraform's `cidr*` functions
//!
//! Addresses of both families are handled as `u128` values confined to the
//! family's width (32 or 128 bits).

use super::{Args, FunctionTable};
use crate::Result;
use crate::expr::value::{list_value, string_value};
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use ohno::{app_err, bail};

pub fn register(table: &mut FunctionTable) {
    table.register("cidrhost", |_, args| {
        let args = Args::exact(args, 2)?;
        let prefix = Prefix::parse(args.string(0)?)?;
        Ok(string_value(prefix.format_addr(prefix.host(args.int(1)?)?)))
    });

    table.register("cidrnetmask", |_, args| {
        let prefix = Prefix::parse(Args::exact(args, 1)?.string(0)?)?;
        if prefix.width != 32 {
            bail!("only IPv4 prefixes have a netmask");
        }
        Ok(string_value(prefix.format_addr(mask(prefix.width, prefix.len))))
    });

    table.register("cidrsubnet", |_, args| {
        let args = Args::exact(args, 3)?;
        let prefix = Prefix::parse(args.string(0)?)?;
        Ok(string_value(prefix.subnet(args.int(1)?, args.int(2)?)?.to_string()))
    });

    table.register("cidrsubnets", |_, args| {
        let args = Args::at_least(args, 1)?;
        let prefix = Prefix::parse(args.string(0)?)?;
        let mut newbits = Vec::with_capacity(args.len() - 1);
        for index in 1..args.len() {
            newbits.push(args.int(index)?);
        }
        let subnets = prefix.subnets(&newbits)?;
        Ok(list_value(subnets.iter().map(|p| string_value(p.to_string())).collect()))
    });
}

/// An address prefix such as `10.0.0.0/16`, normalized to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Prefix {
    addr: u128,
    len: u32,
    width: u32,
}

impl Prefix {
    fn parse(text: &str) -> Result<Self> {
        let (addr, len) = text
            .split_once('/')
            .ok_or_else(|| app_err!("invalid CIDR address '{text}': missing prefix length"))?;
        let addr: IpAddr = addr.parse().map_err(|e| app_err!("invalid CIDR address '{text}': {e}"))?;
        let len: u32 = len.parse().map_err(|e| app_err!("invalid CIDR address '{text}': {e}"))?;

        let (addr, width) = match addr {
            IpAddr::V4(v4) => (u128::from(u32::from(v4)), 32),
            IpAddr::V6(v6) => (u128::from(v6), 128),
        };
        if len > width {
            bail!("invalid CIDR address '{text}': prefix length {len} exceeds {width} bits");
        }

        Ok(Self {
            addr: addr & mask(width, len),
            len,
            width,
        })
    }

    const fn host_bits(&self) -> u32 {
        self.width - self.len
    }

    /// Address of host number `hostnum`; negative numbers count back from the end.
    fn host(&self, hostnum: i64) -> Result<u128> {
        // `None` when the prefix has 128 host bits, where any i64 fits
        let size = 1u128.checked_shl(self.host_bits());

        let offset = if hostnum >= 0 {
            let offset = u128::from(hostnum.unsigned_abs());
            if size.is_some_and(|size| offset >= size) {
                bail!("prefix of {} bits cannot accommodate a host numbered {hostnum}", self.len);
            }
            offset
        } else {
            let back = u128::from(hostnum.unsigned_abs());
            match size {
                Some(size) if back > size => {
                    bail!("prefix of {} bits cannot accommodate a host numbered {hostnum}", self.len)
                }
                Some(size) => size - back,
                None => u128::MAX - back + 1,
            }
        };

        Ok(self.addr | offset)
    }

    fn subnet(&self, newbits: i64, netnum: i64) -> Result<Self> {
        let newbits = u32::try_from(newbits).map_err(|e| app_err!("newbits must not be negative: {e}"))?;
        let len = self
            .len
            .checked_add(newbits)
            .filter(|&len| len <= self.width)
            .ok_or_else(|| app_err!("insufficient address space to extend prefix of {} bits by {newbits}", self.len))?;

        let netnum = u128::try_from(netnum).map_err(|e| app_err!("netnum must not be negative: {e}"))?;
        if 1u128.checked_shl(newbits).is_some_and(|limit| netnum >= limit) {
            bail!("prefix extension of {newbits} bits does not accommodate a subnet numbered {netnum}");
        }

        Ok(Self {
            addr: self.addr | netnum.checked_shl(self.width - len).unwrap_or(0),
            len,
            width: self.width,
        })
    }

    /// Consecutive, aligned subnets of this prefix, one per `newbits` entry.
    fn subnets(&self, newbits: &[i64]) -> Result<Vec<Self>> {
        let mut lens = Vec::with_capacity(newbits.len());
        for &bits in newbits {
            if !(1..=32).contains(&bits) {
                bail!("each subnet must extend the prefix by between 1 and 32 bits, got {bits}");
            }
            let len = self.len + u32::try_from(bits).map_err(|e| app_err!("invalid newbits {bits}: {e}"))?;
            if len > self.width {
                bail!("would extend prefix to {len} bits, which is too long for this address family");
            }
            lens.push(len);
        }

        let Some(&first_len) = lens.first() else {
            return Ok(Vec::new());
        };

        // the block just before the first allocation, so the first step lands on our start
        let mut current = Self {
            addr: self.addr.wrapping_sub(1) & self.full() & mask(self.width, first_len),
            len: first_len,
            width: self.width,
        };

        let mut result = Vec::with_capacity(lens.len());
        for len in lens {
            match current.next(len) {
                Some(next) if self.contains(next.addr) => {
                    result.push(next);
                    current = next;
                }
                _ => bail!("not enough remaining address space for a subnet with a prefix of {len} bits after {current}"),
            }
        }

        Ok(result)
    }

    /// The first block of length `len` starting after the end of this one, or `None` on wrap-around.
    fn next(&self, len: u32) -> Option<Self> {
        let full = self.full();
        let last = self.addr | (full & !mask(self.width, self.len));
        let enclosing = last & mask(self.width, len);
        let enclosing_last = enclosing | (full & !mask(self.width, len));
        let next = enclosing_last.wrapping_add(1) & full;
        if next == 0 {
            return None;
        }

        Some(Self {
            addr: next & mask(self.width, len),
            len,
            width: self.width,
        })
    }

    const fn contains(&self, addr: u128) -> bool {
        addr & mask(self.width, self.len) == self.addr
    }

    const fn full(&self) -> u128 {
        if self.width == 128 { u128::MAX } else { (1u128 << self.width) - 1 }
    }

    fn format_addr(&self, addr: u128) -> String {
        if self.width == 32 {
            #[expect(clippy::cast_possible_truncation, reason = "IPv4 addresses are confined to 32 bits")]
            let v4 = addr as u32;
            Ipv4Addr::from(v4).to_string()
        } else {
            Ipv6Addr::from(addr).to_string()
        }
    }
}

impl core::fmt::Display for Prefix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.format_addr(self.addr), self.len)
    }
}

/// Network mask with `len` leading ones within a `width`-bit address.
const fn mask(width: u32, len: u32) -> u128 {
    if len == 0 {
        return 0;
    }
    (u128::MAX >> (128 - len)) << (width - len)
}
