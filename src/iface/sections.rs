use super::key::Role::{self, Offset, Picture, PicturePosition, Text, Unknown, Value};

#[derive(Debug)]
pub struct KeyDef {
    pub name: &'static str,
    pub role: Role,
}

const fn k(name: &'static str, role: Role) -> KeyDef {
    KeyDef { name, role }
}

/// Static description of one interface screen.
#[derive(Debug)]
pub struct SectionDef {
    pub prefix: &'static str,
    pub title: &'static str,
    pub main_picture: &'static str,
    pub main_position: &'static str,
    /// Sub-elements are placed relative to the main picture's position
    /// rectangle instead of the screen origin.
    pub relative_to_main: bool,
    pub keys: &'static [KeyDef],
}

pub static LOGIN: SectionDef = SectionDef {
    prefix: "Log",
    title: "Login",
    main_picture: "LogMainPic",
    main_position: "LogMain",
    relative_to_main: false,
    keys: &[
        k("LogMain", PicturePosition),
        k("LogMainPic", Picture),
        k("LogName", Text),
        k("LogPass", Text),
        k("LogPlay", PicturePosition),
        k("LogPlayPicDn", Picture),
        k("LogPlayText", Text),
        k("LogReg", PicturePosition),
        k("LogRegPicDn", Picture),
        k("LogRegText", Text),
        k("LogOptions", PicturePosition),
        k("LogOptionsPicDn", Picture),
        k("LogOptionsText", Text),
        k("LogCredits", PicturePosition),
        k("LogCreditsPicDn", Picture),
        k("LogCreditsText", Text),
        k("LogExit", PicturePosition),
        k("LogExitPicDn", Picture),
        k("LogExitText", Text),
        k("LogVersion", Text),
        k("LogMusic", Unknown),
    ],
};

pub static GAME: SectionDef = SectionDef {
    prefix: "Int",
    title: "Game",
    main_picture: "IntMainPic",
    main_position: "IntMain",
    relative_to_main: false,
    keys: &[
        k("IntMain", PicturePosition),
        k("IntMainPic", Picture),
        k("IntAp", PicturePosition),
        k("IntApPic", Picture),
        k("IntApStepX", Value),
        k("IntItem", PicturePosition),
        k("IntItemPicDn", Picture),
        k("IntItemOffsX", Offset),
        k("IntItemOffsY", Offset),
        k("IntChange", PicturePosition),
        k("IntChangePicDn", Picture),
        k("IntPip", PicturePosition),
        k("IntPipPicDn", Picture),
        k("IntFix", PicturePosition),
        k("IntFixPicDn", Picture),
        k("IntMenu", PicturePosition),
        k("IntMenuPicDn", Picture),
        k("IntInv", PicturePosition),
        k("IntInvPicDn", Picture),
        k("IntMap", PicturePosition),
        k("IntMapPicDn", Picture),
        k("IntCha", PicturePosition),
        k("IntChaPicDn", Picture),
        k("IntSkill", PicturePosition),
        k("IntSkillPicDn", Picture),
        k("IntCombatTurn", PicturePosition),
        k("IntCombatTurnPic", Picture),
        k("IntAmmoCount", PicturePosition),
        k("IntAmmoCountPic", Picture),
        k("IntAmmoCountStepY", Value),
        k("IntMess", Text),
        k("IntHpText", Text),
        k("IntAcText", Text),
        k("IntSndButton", Unknown),
    ],
};

pub static INVENTORY: SectionDef = SectionDef {
    prefix: "Inv",
    title: "Inventory",
    main_picture: "InvMainPic",
    main_position: "InvMain",
    relative_to_main: false,
    keys: &[
        k("InvMain", PicturePosition),
        k("InvMainPic", Picture),
        k("InvInv", PicturePosition),
        k("InvInvStepY", Value),
        k("InvChosen", PicturePosition),
        k("InvSlot1", PicturePosition),
        k("InvSlot2", PicturePosition),
        k("InvArmor", PicturePosition),
        k("InvScrUp", PicturePosition),
        k("InvScrUpPicUp", Picture),
        k("InvScrUpPicDn", Picture),
        k("InvScrUpPicOff", Picture),
        k("InvScrDn", PicturePosition),
        k("InvScrDnPicUp", Picture),
        k("InvScrDnPicDn", Picture),
        k("InvScrDnPicOff", Picture),
        k("InvOk", PicturePosition),
        k("InvOkPicDn", Picture),
        k("InvOkText", Text),
        k("InvText", Text),
    ],
};

pub static GLOBAL_MAP: SectionDef = SectionDef {
    prefix: "Gmap",
    title: "GlobalMap",
    main_picture: "GmapMainPic",
    main_position: "GmapMain",
    relative_to_main: true,
    keys: &[
        k("GmapMain", PicturePosition),
        k("GmapMainPic", Picture),
        k("GmapWMap", PicturePosition),
        k("GmapWMapOffs", Offset),
        k("GmapTown", PicturePosition),
        k("GmapTownPicDn", Picture),
        k("GmapMenu", PicturePosition),
        k("GmapMenuPicDn", Picture),
        k("GmapTabs", PicturePosition),
        k("GmapTabsPic", Picture),
        k("GmapTabsStepY", Value),
        k("GmapTabsScrUp", PicturePosition),
        k("GmapTabsScrUpPicDn", Picture),
        k("GmapTabsScrDn", PicturePosition),
        k("GmapTabsScrDnPicDn", Picture),
        k("GmapCar", PicturePosition),
        k("GmapCarPic", Picture),
        k("GmapTime", Text),
        k("GmapDayTime", Text),
    ],
};

pub static DIALOG: SectionDef = SectionDef {
    prefix: "Dlg",
    title: "Dialog",
    main_picture: "DlgMainPic",
    main_position: "DlgMain",
    relative_to_main: false,
    keys: &[
        k("DlgMain", PicturePosition),
        k("DlgMainPic", Picture),
        k("DlgAvatar", PicturePosition),
        k("DlgText", Text),
        k("DlgAnsw", Text),
        k("DlgBarter", PicturePosition),
        k("DlgBarterPicDn", Picture),
        k("DlgBarterText", Text),
        k("DlgSay", PicturePosition),
        k("DlgSayPicDn", Picture),
        k("DlgSayText", Text),
        k("DlgScrUp", PicturePosition),
        k("DlgScrUpPicDn", Picture),
        k("DlgScrDn", PicturePosition),
        k("DlgScrDnPicDn", Picture),
        k("DlgTimer", Text),
    ],
};

pub static CHARACTER: SectionDef = SectionDef {
    prefix: "Cha",
    title: "Character",
    main_picture: "ChaMainPic",
    main_position: "ChaMain",
    relative_to_main: false,
    keys: &[
        k("ChaMain", PicturePosition),
        k("ChaMainPic", Picture),
        k("ChaSpecial", PicturePosition),
        k("ChaSpecialPic", Picture),
        k("ChaSpecialStepY", Value),
        k("ChaSkills", PicturePosition),
        k("ChaSkillsStepY", Value),
        k("ChaOk", PicturePosition),
        k("ChaOkPicDn", Picture),
        k("ChaOkText", Text),
        k("ChaCancel", PicturePosition),
        k("ChaCancelPicDn", Picture),
        k("ChaCancelText", Text),
        k("ChaPrint", PicturePosition),
        k("ChaPrintPicDn", Picture),
        k("ChaPrintText", Text),
        k("ChaName", Text),
        k("ChaAge", Text),
        k("ChaSex", Text),
        k("ChaLevel", Text),
        k("ChaExp", Text),
    ],
};
