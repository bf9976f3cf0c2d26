pub mod playlist;

pub use playlist::{
    Channel, LoadRequest, ParseRequest, Playlist, XtreamLiveRequest, DEFAULT_M3U_PLAYLIST_NAME,
    XTREAM_PLAYLIST_NAME,
};
