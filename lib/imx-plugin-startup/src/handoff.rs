// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handing control back to the boot ROM.
//!
//! The plugin gets loaded one of two ways. Booting from flash, the ROM
//! loaded just the plugin plus the header of whatever is concatenated behind
//! it (normally U-Boot), and we ask it to load the rest. Downloaded over
//! USB/UART by the ROM's serial loader, there's nothing behind us to load,
//! so we drop back into that loader for the host to send the next stage.

use imx_ivt::{BootData, FlashHeader, HeaderError, FLASH_OFFSET, IVT_TAG};
use imx_romapi::{BootRom, HabStatus};
use regtable::Mmio;

/// The ROM keeps its output parameters in OCRAM when booting from flash,
/// and somewhere below it when running the serial loader.
pub const OCRAM_START: u32 = 0x0090_0000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BootPath {
    /// Booted from flash: finish loading the image behind the plugin.
    ContinueLoad,
    /// Serial-downloaded: return to the ROM's serial loader.
    Fallback,
}

/// Decides how we were loaded from where the ROM put its `start` output
/// parameter.
pub fn boot_path(param_addr: u32) -> BootPath {
    if param_addr < OCRAM_START {
        BootPath::Fallback
    } else {
        BootPath::ContinueLoad
    }
}

/// Where this plugin ended up, from the linker script.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PluginImage {
    /// First byte past the plugin: the next image's header.
    pub end: u32,
    /// Bytes from the start of the plugin to `end`.
    pub size: u32,
}

/// What the ROM needs to boot the next image; written back through the
/// entry point's output parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    pub start: u32,
    pub bytes: u32,
    pub ivt_offset: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandoffError {
    /// Nothing usable is concatenated behind the plugin.
    NextImage(HeaderError),
    /// The ROM stopped short of the size we asked for.
    ShortLoad { loaded: u32, wanted: u32 },
    /// What the ROM loaded doesn't start with an image header.
    ReloadBadTag(u8),
}

impl From<HeaderError> for HandoffError {
    fn from(e: HeaderError) -> Self {
        HandoffError::NextImage(e)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "imx6")] {
        /// PL310 L2 cache controller, control register.
        const L2_CTRL: u32 = 0x00a0_2100;

        /// `hwcnfg_setup` returns with the L2 cache on. The ROM isn't done
        /// with memory yet and expects it off.
        fn disable_l2<M: Mmio + ?Sized>(mmio: &mut M) {
            mmio.write32(L2_CTRL, 0);
        }
    } else {
        fn disable_l2<M: Mmio + ?Sized>(_mmio: &mut M) {}
    }
}

/// Has the ROM load the image concatenated behind the plugin.
///
/// That image's header was written for an image at the start of flash, not
/// one `plugin.size` bytes further in, so its load address and size are
/// stretched to cover the plugin as well before handing them to the ROM.
/// The ROM always loads from the start of flash.
pub fn load_next_image<M, R>(
    mmio: &mut M,
    rom: &mut R,
    plugin: &PluginImage,
) -> Result<LoadedImage, HandoffError>
where
    M: Mmio + ?Sized,
    R: BootRom + ?Sized,
{
    let next = FlashHeader::read(mmio, plugin.end);
    next.validate()?;

    let boot = BootData {
        start: next.boot.start.wrapping_sub(plugin.size),
        size: next.boot.size.wrapping_add(plugin.size),
        plugin: 0,
    };

    // In: what's already loaded (nothing). Out: what's loaded now.
    let mut loaded_start = boot.start;
    let mut loaded_size = 0;
    rom.hwcnfg_setup(&mut loaded_start, &mut loaded_size, &boot);

    disable_l2(mmio);

    if loaded_size < boot.size {
        return Err(HandoffError::ShortLoad {
            loaded: loaded_size,
            wanted: boot.size,
        });
    }

    let reloaded =
        FlashHeader::read(mmio, loaded_start.wrapping_add(FLASH_OFFSET));
    if reloaded.ivt.header.tag != IVT_TAG {
        return Err(HandoffError::ReloadBadTag(reloaded.ivt.header.tag));
    }

    // The ROM validates and boots the next image from its own header.
    Ok(LoadedImage {
        start: next.boot.start,
        bytes: next.boot.size,
        ivt_offset: FLASH_OFFSET,
    })
}

/// Drops back into the ROM's serial loader.
///
/// HAB has to be entered first, and the loader is only safe to call if that
/// worked. Returns once the ROM is done with us either way.
pub fn fall_through<R: BootRom + ?Sized>(rom: &mut R) -> HabStatus {
    let status = rom.hab_rvt_entry();
    if status == HabStatus::Success {
        rom.hab_failsafe();
    }
    status
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use imx_ivt::{Ivt, IvtHeader, BOOT_DATA_OFFSET};
    use regtable::mock::MockRegs;
    use zerocopy::IntoBytes;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Call {
        HwcnfgSetup(u32, u32, BootData),
        HabRvtEntry,
        HabFailsafe,
    }

    /// Stands in for the ROM, recording every call.
    pub(crate) struct FakeRom {
        pub hab: HabStatus,
        /// How much `hwcnfg_setup` claims to load; `None` means all of it.
        pub loads: Option<u32>,
        pub calls: Vec<Call>,
    }

    impl FakeRom {
        pub fn new() -> Self {
            Self {
                hab: HabStatus::Success,
                loads: None,
                calls: Vec::new(),
            }
        }
    }

    impl BootRom for FakeRom {
        fn hwcnfg_setup(
            &mut self,
            start: &mut u32,
            bytes: &mut u32,
            boot: &BootData,
        ) {
            self.calls.push(Call::HwcnfgSetup(*start, *bytes, *boot));
            *bytes = self.loads.unwrap_or(boot.size);
        }

        fn hab_rvt_entry(&mut self) -> HabStatus {
            self.calls.push(Call::HabRvtEntry);
            self.hab
        }

        fn hab_failsafe(&mut self) {
            self.calls.push(Call::HabFailsafe);
        }
    }

    pub(crate) const PLUGIN: PluginImage = PluginImage {
        end: 0x0091_2000,
        size: 0x2000,
    };

    /// U-Boot's header, as mkimage writes it for an image at 0x1780_0000.
    pub(crate) fn uboot_header() -> FlashHeader {
        let self_ptr = 0x177f_f400;
        FlashHeader {
            ivt: Ivt {
                header: IvtHeader::new(),
                entry: 0x1780_0000,
                boot_data: self_ptr + BOOT_DATA_OFFSET,
                self_ptr,
                ..Default::default()
            },
            boot: BootData {
                start: self_ptr - FLASH_OFFSET,
                size: 0x6_0000,
                plugin: 0,
            },
        }
    }

    /// Where the adjusted load puts the first header in DRAM.
    pub(crate) const RELOADED_HEADER: u32 = 0x177f_d000 + FLASH_OFFSET;

    /// Memory as it is after the ROM loaded the plugin, and (pretending the
    /// ROM did it) after `hwcnfg_setup` loaded the rest.
    pub(crate) fn loaded_memory(regs: &mut MockRegs) {
        regs.load(PLUGIN.end, uboot_header().as_bytes());
        regs.load(RELOADED_HEADER, uboot_header().as_bytes());
    }

    #[test]
    fn routing_threshold() {
        assert_eq!(boot_path(0x008f_ffff), BootPath::Fallback);
        assert_eq!(boot_path(0x0090_0000), BootPath::ContinueLoad);
        assert_eq!(boot_path(0), BootPath::Fallback);
        assert_eq!(boot_path(0x0091_8000), BootPath::ContinueLoad);
    }

    #[test]
    fn loads_next_image() {
        let mut regs = MockRegs::new();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();

        let img = load_next_image(&mut regs, &mut rom, &PLUGIN).unwrap();
        assert_eq!(
            img,
            LoadedImage {
                start: 0x177f_f000,
                bytes: 0x6_0000,
                ivt_offset: 0x400,
            }
        );
        assert_eq!(
            rom.calls,
            vec![Call::HwcnfgSetup(
                0x177f_d000,
                0,
                BootData {
                    start: 0x177f_d000,
                    size: 0x6_2000,
                    plugin: 0,
                }
            )]
        );
    }

    #[cfg(feature = "imx6")]
    #[test]
    fn l2_disabled_after_load() {
        let mut regs = MockRegs::new();
        loaded_memory(&mut regs);
        load_next_image(&mut regs, &mut FakeRom::new(), &PLUGIN).unwrap();
        assert_eq!(regs.writes(), &[(L2_CTRL, 0)]);
    }

    #[cfg(feature = "imx7")]
    #[test]
    fn nothing_written_on_imx7() {
        let mut regs = MockRegs::new();
        loaded_memory(&mut regs);
        load_next_image(&mut regs, &mut FakeRom::new(), &PLUGIN).unwrap();
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn no_image_behind_plugin() {
        let mut regs = MockRegs::new();
        let mut rom = FakeRom::new();
        assert_eq!(
            load_next_image(&mut regs, &mut rom, &PLUGIN),
            Err(HandoffError::NextImage(HeaderError::BadTag(0)))
        );
        assert!(rom.calls.is_empty());
    }

    #[test]
    fn misplaced_boot_data() {
        let mut h = uboot_header();
        h.ivt.boot_data += 4;
        let mut regs = MockRegs::new();
        regs.load(PLUGIN.end, h.as_bytes());
        let mut rom = FakeRom::new();

        assert_eq!(
            load_next_image(&mut regs, &mut rom, &PLUGIN),
            Err(HandoffError::NextImage(HeaderError::BootDataMisplaced {
                offset: 36
            }))
        );
        assert!(rom.calls.is_empty());
    }

    #[test]
    fn short_load_fails_even_with_good_tag() {
        let mut regs = MockRegs::new();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();
        rom.loads = Some(0x6_1fff);

        assert_eq!(
            load_next_image(&mut regs, &mut rom, &PLUGIN),
            Err(HandoffError::ShortLoad {
                loaded: 0x6_1fff,
                wanted: 0x6_2000,
            })
        );
    }

    #[test]
    fn longer_load_is_fine() {
        let mut regs = MockRegs::new();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();
        rom.loads = Some(0x8_0000);
        assert!(load_next_image(&mut regs, &mut rom, &PLUGIN).is_ok());
    }

    #[test]
    fn garbage_where_the_load_landed() {
        let mut regs = MockRegs::new();
        regs.load(PLUGIN.end, uboot_header().as_bytes());
        regs.preset(RELOADED_HEADER, 0x4020_00d2);

        assert_eq!(
            load_next_image(&mut regs, &mut FakeRom::new(), &PLUGIN),
            Err(HandoffError::ReloadBadTag(0xd2))
        );
    }

    #[test]
    fn failsafe_only_after_hab_success() {
        let mut rom = FakeRom::new();
        assert_eq!(fall_through(&mut rom), HabStatus::Success);
        assert_eq!(rom.calls, vec![Call::HabRvtEntry, Call::HabFailsafe]);

        for hab in [
            HabStatus::Failure,
            HabStatus::Warning,
            HabStatus::Any,
            HabStatus::Unknown,
        ] {
            let mut rom = FakeRom::new();
            rom.hab = hab;
            assert_eq!(fall_through(&mut rom), hab);
            assert_eq!(rom.calls, vec![Call::HabRvtEntry]);
        }
    }
}
