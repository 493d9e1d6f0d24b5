macro_rules! impl_mods {
    ($func_name:ident, $const_name:ident) => {
        #[inline]
        fn $func_name(self) -> bool {
            self & Self::$const_name > 0
        }
    };
}

/// Convenience methods on the legacy bit representation of mods.
pub trait GameMods: Copy {
    const NF: u32 = 1 << 0;
    const EZ: u32 = 1 << 1;
    const TD: u32 = 1 << 2;
    const HD: u32 = 1 << 3;
    const HR: u32 = 1 << 4;
    const SD: u32 = 1 << 5;
    const DT: u32 = 1 << 6;
    const RX: u32 = 1 << 7;
    const HT: u32 = 1 << 8;
    const NC: u32 = 1 << 9;
    const FL: u32 = 1 << 10;
    const AT: u32 = 1 << 11;
    const SO: u32 = 1 << 12;
    const AP: u32 = 1 << 13;
    const PF: u32 = 1 << 14;
    const V2: u32 = 1 << 29;

    /// Clock rate implied by DT, NC, or HT.
    fn clock_rate(self) -> f64;

    /// Only the mods that influence difficulty values.
    ///
    /// NC is folded into DT and HD only counts in combination with FL.
    fn difficulty_mask(self) -> u32;

    /// Concatenated acronyms, `"NM"` if no mod is set.
    fn acronyms(self) -> String;

    fn nf(self) -> bool;
    fn ez(self) -> bool;
    fn td(self) -> bool;
    fn hd(self) -> bool;
    fn hr(self) -> bool;
    fn sd(self) -> bool;
    fn dt(self) -> bool;
    fn rx(self) -> bool;
    fn ht(self) -> bool;
    fn nc(self) -> bool;
    fn fl(self) -> bool;
    fn so(self) -> bool;
    fn ap(self) -> bool;
    fn pf(self) -> bool;
    fn v2(self) -> bool;
}

const ACRONYMS: [(u32, &str); 16] = [
    (<u32 as GameMods>::NF, "NF"),
    (<u32 as GameMods>::EZ, "EZ"),
    (<u32 as GameMods>::TD, "TD"),
    (<u32 as GameMods>::HD, "HD"),
    (<u32 as GameMods>::HR, "HR"),
    (<u32 as GameMods>::SD, "SD"),
    (<u32 as GameMods>::DT, "DT"),
    (<u32 as GameMods>::RX, "RX"),
    (<u32 as GameMods>::HT, "HT"),
    (<u32 as GameMods>::NC, "NC"),
    (<u32 as GameMods>::FL, "FL"),
    (<u32 as GameMods>::AT, "AT"),
    (<u32 as GameMods>::SO, "SO"),
    (<u32 as GameMods>::AP, "AP"),
    (<u32 as GameMods>::PF, "PF"),
    (<u32 as GameMods>::V2, "V2"),
];

impl GameMods for u32 {
    #[inline]
    fn clock_rate(self) -> f64 {
        if self & (Self::DT | Self::NC) > 0 {
            1.5
        } else if self & Self::HT > 0 {
            0.75
        } else {
            1.0
        }
    }

    fn difficulty_mask(self) -> u32 {
        let mut mods = self;

        if mods.nc() {
            mods = (mods & !Self::NC) | Self::DT;
        }

        let mut masked = mods & (Self::HR | Self::EZ | Self::DT | Self::HT | Self::FL | Self::RX | Self::TD);

        if mods & (Self::HD | Self::FL) == Self::HD | Self::FL {
            masked |= Self::HD;
        }

        masked
    }

    fn acronyms(self) -> String {
        let acronyms: String = ACRONYMS
            .iter()
            .filter(|(bit, _)| self & bit > 0)
            .map(|(_, acronym)| *acronym)
            .collect();

        if acronyms.is_empty() {
            String::from("NM")
        } else {
            acronyms
        }
    }

    impl_mods!(nf, NF);
    impl_mods!(ez, EZ);
    impl_mods!(td, TD);
    impl_mods!(hd, HD);
    impl_mods!(hr, HR);
    impl_mods!(sd, SD);
    impl_mods!(dt, DT);
    impl_mods!(rx, RX);
    impl_mods!(ht, HT);
    impl_mods!(nc, NC);
    impl_mods!(fl, FL);
    impl_mods!(so, SO);
    impl_mods!(ap, AP);
    impl_mods!(pf, PF);
    impl_mods!(v2, V2);
}

#[cfg(test)]
mod tests {
    use super::GameMods;

    #[test]
    fn nightcore_counts_as_double_time() {
        let nc = u32::NC | u32::DT;

        assert!((nc.clock_rate() - 1.5).abs() < f64::EPSILON);
        assert_eq!(u32::NC.difficulty_mask(), u32::DT);
    }

    #[test]
    fn hidden_only_matters_with_flashlight() {
        assert_eq!(u32::HD.difficulty_mask(), 0);
        assert_eq!((u32::HD | u32::FL).difficulty_mask(), u32::HD | u32::FL);
        assert_eq!((u32::HD | u32::NF | u32::HR).difficulty_mask(), u32::HR);
    }

    #[test]
    fn acronyms() {
        assert_eq!(0_u32.acronyms(), "NM");
        assert_eq!((u32::HD | u32::HR).acronyms(), "HDHR");
        assert_eq!((u32::DT | u32::FL | u32::AP).acronyms(), "DTFLAP");
    }
}
