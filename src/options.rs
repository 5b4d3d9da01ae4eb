//! Photography option enumerations.
//!
//! Each option has a stable identifier (used by the CLI and serde) and a
//! human-readable label. Labels are the values shown to users and are what
//! the prompt composer interpolates; several are not in English, which is why
//! the remote optimizer is asked to translate them.

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $id:literal, $label:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $id)] $variant, )+
        }

        impl $name {
            /// Every value, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the stable identifier.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// Returns the human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StudioError;

            /// Parses an identifier (case-insensitive) or an exact label.
            fn from_str(s: &str) -> Result<Self> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle) || v.label() == needle)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        StudioError::InvalidRequest(format!(
                            "unknown {} '{}' (expected one of: {})",
                            $kind,
                            s,
                            expected.join(", ")
                        ))
                    })
            }
        }
    };
}

option_enum! {
    /// Camera angle relative to the subject.
    #[derive(Default)]
    CameraAngle("camera angle") {
        /// Natural eye-level shot.
        #[default]
        EyeLevel => "eye-level", "مستوى العين (طبيعي)";
        /// Low "hero" angle.
        LowAngle => "low-angle", "زاوية سفلية (Hero)";
        /// Top-down flat lay.
        TopDown => "top-down", "من الأعلى (Flat Lay)";
        /// From the subject's right.
        RightSide => "right-side", "من اليمين";
        /// From the subject's left.
        LeftSide => "left-side", "من اليسار";
        /// From behind.
        Back => "back", "من الخلف";
    }
}

option_enum! {
    /// Camera distance / shot type.
    #[derive(Default)]
    CameraDistance("camera distance") {
        /// Extreme detail close-up.
        Macro => "macro", "ماكرو (تقريب فائق للتفاصيل)";
        /// Tight close-up.
        CloseUp => "close-up", "قريب جداً (Close Up)";
        /// Head and shoulders.
        MediumClose => "medium-close", "متوسط القرب (Portrait)";
        /// Waist up.
        #[default]
        Medium => "medium", "مسافة متوسطة (Medium Shot)";
        /// Whole subject in frame.
        FullShot => "full-shot", "لقطة كاملة (Full Body)";
        /// Subject with surroundings.
        LongShot => "long-shot", "بعيد (مع الخلفية)";
        /// Establishing shot.
        ExtremeLongShot => "extreme-long-shot", "بعيد جداً (منظر عام)";
    }
}

option_enum! {
    /// Lighting setup.
    #[derive(Default)]
    LightingPreset("lighting preset") {
        /// Let the model decide.
        Auto => "auto", "تلقائي (Auto)";
        /// Soft studio light.
        #[default]
        Softbox => "softbox", "إضاءة استوديو ناعمة (Softbox)";
        /// Back light outlining the silhouette.
        Rim => "rim", "إضاءة خلفية (Rim Light)";
        /// Focused spot.
        Spotlight => "spotlight", "إضاءة مركزة (Spotlight)";
        /// Calm ambient light.
        Ambient => "ambient", "إضاءة محيطية هادئة";
        /// Cyberpunk neon.
        Neon => "neon", "نيون (Cyberpunk)";
        /// Natural daylight.
        Sunlight => "sunlight", "ضوء شمس طبيعي";
        /// Cinematic high contrast.
        Dramatic => "dramatic", "سينمائي درامي";
    }
}

option_enum! {
    /// Subject pose or product placement.
    #[derive(Default)]
    SubjectPose("pose") {
        /// Keep whatever pose the source image has.
        #[default]
        Auto => "auto", "تلقائي (حسب الصورة)";
        /// Seated at an office desk.
        SittingDesk => "sitting-desk", "جالس على كرسي مكتب (عمل)";
        /// Standing, presenting.
        StandingConfident => "standing-confident", "واقف بثقة (Presentation)";
        /// Full body in frame.
        FullBody => "full-body", "صورة كاملة للجسم (Full Body)";
        /// Headshot.
        CloseUp => "close-up", "صورة قريبة للوجه (Headshot)";
        /// Heroic low angle.
        LowAngleHero => "low-angle-hero", "زاوية بطولية من الأسفل";
        /// Side profile.
        SideProfile => "side-profile", "بروفايل جانبي";
        /// Typing at a keyboard.
        BusyTyping => "busy-typing", "منهمك في الكتابة (Coding)";
        /// Wide shot with surroundings.
        WideShot => "wide-shot", "لقطة واسعة مع المحيط";
        /// Shoe floating mid-air.
        FloatingShoe => "floating-shoe", "حذاء طائر (ديناميكي)";
        /// Product on a display pedestal.
        OnPedestal => "on-pedestal", "على منصة عرض";
        /// Runway walk.
        FashionWalk => "fashion-walk", "مشية عارض أزياء";
        /// Phone held in hand.
        PhoneHandHeld => "phone-hand-held", "ممسوك باليد (In Hand)";
        /// Phone lying flat on a table.
        PhoneFlatLay => "phone-flat-lay", "موضوع على طاولة (Flat)";
    }
}

option_enum! {
    /// Where the subject is looking.
    #[derive(Default)]
    FaceDirection("face direction") {
        /// Eye contact with the camera.
        #[default]
        Camera => "camera", "نظر للكاميرا مباشرة (Eye Contact)";
        /// Candid, looking away.
        Away => "away", "نظر بعيداً (شارد / Candid)";
        /// Looking left.
        Left => "left", "نظر لجهة اليسار";
        /// Looking right.
        Right => "right", "نظر لجهة اليمين";
        /// Looking up.
        Up => "up", "نظر للأعلى (إلهام/تفكير)";
        /// Looking down.
        Down => "down", "نظر للأسفل (تركيز/عمل)";
        /// Looking at a screen.
        Screen => "screen", "نظر للشاشة (للمبرمجين)";
        /// Eyes closed.
        Closed => "closed", "مغمض العينين (تأمل)";
    }
}

option_enum! {
    /// Target output resolution.
    #[derive(Default)]
    Resolution("resolution") {
        /// Full HD.
        #[default]
        Fhd => "fhd", "دقة عالية (FHD)";
        /// 2K.
        Qhd => "2k", "دقة فائقة (2K)";
        /// 4K.
        Uhd => "4k", "دقة سينمائية (4K)";
    }
}

option_enum! {
    /// Output aspect ratio.
    #[derive(Default)]
    AspectRatio("aspect ratio") {
        /// 1:1.
        #[default]
        Square => "1:1", "1:1 (مربع)";
        /// 4:5.
        Portrait => "4:5", "4:5 (بورتريه)";
        /// 9:16.
        Story => "9:16", "9:16 (ستوري)";
        /// 16:9.
        Landscape => "16:9", "16:9 (عريض)";
        /// 2:1.
        Wide => "2:1", "2:1 (سينمائي)";
    }
}

option_enum! {
    /// Social platform shortcuts that pick an aspect ratio.
    SocialPlatform("social platform") {
        /// Square feed post.
        InstagramPost => "instagram-post", "Instagram Post";
        /// Portrait feed post.
        InstagramPortrait => "instagram-portrait", "Instagram Portrait";
        /// Vertical story or short video.
        InstagramStory => "instagram-story", "Story / TikTok";
        /// Video thumbnail.
        YoutubeThumbnail => "youtube-thumbnail", "YouTube Thumbnail";
        /// Page cover.
        FacebookCover => "facebook-cover", "Facebook Cover";
        /// Timeline post.
        TwitterPost => "twitter-post", "Twitter / X Post";
    }
}

impl SocialPlatform {
    /// Returns the aspect ratio used for this platform.
    pub fn aspect_ratio(&self) -> AspectRatio {
        match self {
            Self::InstagramPost => AspectRatio::Square,
            Self::InstagramPortrait => AspectRatio::Portrait,
            Self::InstagramStory => AspectRatio::Story,
            Self::YoutubeThumbnail | Self::FacebookCover | Self::TwitterPost => {
                AspectRatio::Landscape
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_id_and_label() {
        assert_eq!("eye-level".parse::<CameraAngle>().unwrap(), CameraAngle::EyeLevel);
        assert_eq!("EYE-LEVEL".parse::<CameraAngle>().unwrap(), CameraAngle::EyeLevel);
        assert_eq!(
            "إضاءة خلفية (Rim Light)".parse::<LightingPreset>().unwrap(),
            LightingPreset::Rim
        );
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
    }

    #[test]
    fn test_parse_unknown_lists_choices() {
        let err = "sideways".parse::<CameraAngle>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown camera angle 'sideways'"));
        assert!(msg.contains("eye-level"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(CameraDistance::CloseUp.to_string(), "قريب جداً (Close Up)");
        assert_eq!(AspectRatio::Story.to_string(), "9:16 (ستوري)");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = SubjectPose::ALL.iter().map(|p| p.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SubjectPose::ALL.len());
    }

    #[test]
    fn test_social_platform_aspect_ratio() {
        assert_eq!(SocialPlatform::InstagramPost.aspect_ratio(), AspectRatio::Square);
        assert_eq!(SocialPlatform::InstagramPortrait.aspect_ratio(), AspectRatio::Portrait);
        assert_eq!(SocialPlatform::InstagramStory.aspect_ratio(), AspectRatio::Story);
        assert_eq!(SocialPlatform::FacebookCover.aspect_ratio(), AspectRatio::Landscape);
    }

    #[test]
    fn test_serde_uses_id() {
        let json = serde_json::to_string(&Resolution::Uhd).unwrap();
        assert_eq!(json, "\"4k\"");
        let parsed: FaceDirection = serde_json::from_str("\"screen\"").unwrap();
        assert_eq!(parsed, FaceDirection::Screen);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(CameraAngle::default(), CameraAngle::EyeLevel);
        assert_eq!(CameraDistance::default(), CameraDistance::Medium);
        assert_eq!(LightingPreset::default(), LightingPreset::Softbox);
        assert_eq!(Resolution::default(), Resolution::Fhd);
        assert_eq!(AspectRatio::default(), AspectRatio::Square);
        assert_eq!(SubjectPose::default(), SubjectPose::Auto);
        assert_eq!(FaceDirection::default(), FaceDirection::Camera);
    }
}
